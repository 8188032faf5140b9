pub mod pool;
pub mod route;
pub mod token;

pub use pool::{Pool, PoolId};
pub use route::{Hop, Route, SplitQuote};
pub use token::Token;
