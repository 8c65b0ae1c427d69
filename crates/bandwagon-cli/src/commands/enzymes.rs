use crate::cli::EnzymesArgs;
use crate::error::Result;
use bandwagon::core::digestion::enzymes::{self, RestrictionEnzyme};

fn matching(search: Option<&str>) -> Vec<&'static RestrictionEnzyme> {
    let needle = search.map(|s| s.trim().to_ascii_uppercase());
    enzymes::all()
        .into_iter()
        .filter(|enzyme| match &needle {
            Some(needle) => {
                enzyme.name.to_ascii_uppercase().contains(needle.as_str()) || enzyme.site.contains(needle.as_str())
            }
            None => true,
        })
        .collect()
}

pub fn run(args: EnzymesArgs) -> Result<()> {
    let found = matching(args.search.as_deref());
    if found.is_empty() {
        println!("No enzyme matches '{}'.", args.search.unwrap_or_default());
        return Ok(());
    }
    println!("{:<12} {:<14} {:>4} {:>4}", "NAME", "SITE", "TOP", "BOT");
    for enzyme in found {
        println!(
            "{:<12} {:<14} {:>4} {:>4}",
            enzyme.name, enzyme.site, enzyme.top_cut, enzyme.bottom_cut
        );
    }
    Ok(())
}
