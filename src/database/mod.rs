pub mod storage;
pub mod supabase;

pub use storage::StorageBucket;
pub use supabase::SupabaseClient;
