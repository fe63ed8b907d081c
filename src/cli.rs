use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "refscan",
    version,
    about = "Reference search over serialized object documents",
    after_help = r#"Examples:
  refscan text --root ./project --ext .scene --query "spawn_point"
  refscan asset --root ./project --ext .scene --guid 3f7a1c... --file-id 205
  refscan asset --root ./project --guid 3f7a1c... --file-id 205 --load
  refscan live --root ./project --open scenes/arena.scene --open scenes/lobby.scene --guid 3f7a1c... --file-id 205
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan files under the root for a free-text needle.
    Text {
        /// Repository root directory.
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Repository-relative subtree to scan.
        #[arg(long, default_value = "")]
        path: String,
        /// File extension filter, including the dot.
        #[arg(long, default_value = "")]
        ext: String,
        #[arg(long)]
        query: String,
    },
    /// Scan files for references to a repository asset.
    Asset {
        /// Repository root directory.
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Repository-relative subtree to scan.
        #[arg(long, default_value = "")]
        path: String,
        /// File extension filter, including the dot.
        #[arg(long, default_value = "")]
        ext: String,
        /// Repository guid of the target.
        #[arg(long)]
        guid: String,
        /// Local file id of the target within its document.
        #[arg(long)]
        file_id: i64,
        /// Display label for the target.
        #[arg(long)]
        name: Option<String>,
        /// Open matched containers and scan their live nodes too.
        #[arg(long)]
        load: bool,
    },
    /// Scan explicitly opened containers for references to an entity.
    Live {
        /// Repository root directory.
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Container documents to open before scanning (repeatable).
        #[arg(long = "open")]
        open: Vec<String>,
        /// Repository guid of the target.
        #[arg(long)]
        guid: String,
        /// Local file id of the target within its document.
        #[arg(long)]
        file_id: i64,
        /// Behavior-type filter, short or module::Name.
        #[arg(long = "type")]
        type_filter: Option<String>,
    },
}
