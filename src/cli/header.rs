//! Header command implementation

use crate::cli::{HeaderArgs, OutputFormat};
use crate::core::error::Result;
use crate::output::format_header;
use crate::tags::TagFileHeader;

/// Run the header command
pub fn run(args: HeaderArgs) -> Result<()> {
    let header = TagFileHeader::parse(&args.file)?;
    print!(
        "{}",
        format_header(&header, OutputFormat::from_json_flag(args.json))
    );
    Ok(())
}
