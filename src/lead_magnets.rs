//! The static lead-magnet table: every downloadable asset the site offers in
//! exchange for an email address. Immutable, known at compile time.

use strum_macros::AsRefStr;

/// Whether a magnet feeds the quick-win track or the nurture track of the
/// email automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum Category {
    #[strum(serialize = "quick")]
    Quick,
    #[strum(serialize = "nurture")]
    Nurture,
}

#[derive(Debug)]
pub struct LeadMagnet {
    pub slug: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub download_path: &'static str,
}

/// The first entry doubles as the default for unknown slugs.
static LEAD_MAGNETS: &[LeadMagnet] = &[
    LeadMagnet {
        slug: "drift-checklist",
        name: "Design Drift Checklist",
        category: Category::Quick,
        download_path: "/downloads/drift-checklist.pdf",
    },
    LeadMagnet {
        slug: "maturity-model",
        name: "Design System Maturity Model",
        category: Category::Nurture,
        download_path: "/downloads/maturity-model.pdf",
    },
    LeadMagnet {
        slug: "pr-review-cheatsheet",
        name: "PR Review Cheatsheet",
        category: Category::Quick,
        download_path: "/downloads/pr-review-cheatsheet.pdf",
    },
];

/// Looks a slug up in the table. An unknown slug resolves to the default
/// entry rather than failing: a stale link should still get the subscriber
/// *something*.
pub fn resolve(slug: &str) -> &'static LeadMagnet {
    LEAD_MAGNETS
        .iter()
        .find(|m| m.slug == slug)
        .unwrap_or(&LEAD_MAGNETS[0])
}
