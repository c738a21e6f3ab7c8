pub mod admin_instructions;
pub mod claim_instructions;
pub mod utils;
