//! Run artifacts and the console report.
//!
//! # Submodules
//!
//! - [`json`]: writes the full-run and daily-summary JSON arrays
//! - [`console`]: renders the human-readable report printed to stdout
//!
//! # Output Files
//!
//! ```text
//! blog_posts.json          # every post scraped this run
//! todays_summaries.json    # today's stored posts, summarized (overwritten)
//! ```

pub mod console;
pub mod json;
