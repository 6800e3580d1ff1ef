// Job postings: creation (manual or scraped), candidate matching and external recommendations.
// Scoring and scraping happen in the AI service; everything here is orchestration.

pub mod create;
pub mod handlers;
pub mod matching;
pub mod recommend;
pub mod store;
