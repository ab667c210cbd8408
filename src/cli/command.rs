use std::path::PathBuf;

pub enum Command {
    /// Print the known entity kinds and their default page sizes.
    Kinds,
    /// Run a query and print one page per line.
    Query {
        kind: String,
        fixture: Option<PathBuf>,
        filter_json: Option<String>,
        sort: Option<String>,
        limit: Option<usize>,
        pages: usize,
    },
    Count {
        kind: String,
        fixture: Option<PathBuf>,
        filter_json: Option<String>,
    },
}
