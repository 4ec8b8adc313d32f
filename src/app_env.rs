/// URL for accessing the PostgreSQL database (should contain a schema name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Port the HTTP server should listen on. Defaults to 3000 when absent
pub const PORT: &str = "PORT";
/// Log level configuration for the application, using [EnvFilter](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
/// directive syntax
pub const LOG_LEVEL: &str = "LOG_LEVEL";
