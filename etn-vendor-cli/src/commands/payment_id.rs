//! Payment id generation

use anyhow::Result;
use etn_vendor::IdentifierGenerator;

/// Print `count` fresh payment ids, one per line.
pub fn run(count: usize) -> Result<()> {
    let generator = IdentifierGenerator::new();
    for _ in 0..count {
        println!("{}", generator.generate()?);
    }
    Ok(())
}
