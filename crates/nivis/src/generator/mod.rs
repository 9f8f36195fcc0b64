mod counter;
mod snowflake;

pub use counter::CounterGenerator;
pub use snowflake::SnowflakeGenerator;
