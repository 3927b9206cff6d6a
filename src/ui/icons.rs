pub struct Icons;

impl Icons {
    pub const CALENDAR: &str = "📅";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const DEL: &str = "🗑️";
    pub const EMPTY: &str = "∅";
}
