pub mod initialize;
pub use initialize::*;

pub mod set_epoch_root;
pub use set_epoch_root::*;

pub mod set_admin;
pub use set_admin::*;

pub mod set_mint;
pub use set_mint::*;

pub mod claim;
pub use claim::*;

pub mod claim_v2;
pub use claim_v2::*;
