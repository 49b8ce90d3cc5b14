pub mod compactor;
pub mod export;
pub mod journal;
pub mod ledger;
pub mod limits;
pub mod menu;
pub mod model;
pub mod observability;
