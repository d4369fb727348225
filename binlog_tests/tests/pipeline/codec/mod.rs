pub mod formatting;
pub mod routing;
pub mod tokens;
