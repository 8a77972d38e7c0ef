//! Terminal front-end for the portfolio content backend.
//!
//! ```bash
//! # Projects, filtered, with the live fetch raced against the load deadline
//! portfolio browse projects --category ai --query python
//!
//! # Admin: sign in and add a project
//! portfolio admin -e me@example.com add-project --title "Router" --category network
//!
//! # Check backend configuration
//! portfolio env-check
//! ```

mod platform;

fn main() -> anyhow::Result<()> {
    platform::run_app()
}
