//! Value objects - immutable types that represent domain concepts

mod alliance_tag;
mod lord_id;
mod role;
mod snowflake;

pub use alliance_tag::AllianceTag;
pub use lord_id::{LordId, LordIdParseError};
pub use role::UserRole;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
