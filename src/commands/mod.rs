pub mod alias_cmd;
pub mod schema;
