//! Entry Classifier and Category Sorter.
//!
//! Every entry lands in exactly one of six fixed categories; anything with an
//! unrecognized type tag goes to [`Category::Miscellaneous`].

use serde::{Deserialize, Serialize};

use crate::bibliography::entry::BibEntry;

/// The six fixed publication categories, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Article,
    Book,
    ConferencePaper,
    Miscellaneous,
    Magazine,
    Journal,
}

impl Category {
    /// All categories in the order the renderer emits them.
    pub const DISPLAY_ORDER: [Category; 6] = [
        Category::Article,
        Category::Book,
        Category::ConferencePaper,
        Category::Miscellaneous,
        Category::Magazine,
        Category::Journal,
    ];

    /// Section header printed above the category. Kept verbatim from the
    /// published documents, including the lower-case "revistas".
    pub fn display_title(self) -> &'static str {
        match self {
            Category::Article => "Artigos",
            Category::Book => "Livros",
            Category::ConferencePaper => "Periódicos",
            Category::Miscellaneous => "Outros",
            Category::Magazine => "revistas",
            Category::Journal => "Jornais",
        }
    }

    /// BibTeX type tag that maps to this category.
    pub fn type_tag(self) -> &'static str {
        match self {
            Category::Article => "article",
            Category::Book => "book",
            Category::ConferencePaper => "inproceedings",
            Category::Miscellaneous => "misc",
            Category::Magazine => "magazine",
            Category::Journal => "journal",
        }
    }

    /// Maps an entry type tag to its category. Total: unknown tags are miscellaneous.
    pub fn from_type_tag(tag: &str) -> Category {
        Category::DISPLAY_ORDER
            .into_iter()
            .find(|c| c.type_tag().eq_ignore_ascii_case(tag))
            .unwrap_or(Category::Miscellaneous)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Entries grouped by category. All six groups always exist, possibly empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedEntries<'a> {
    groups: [Vec<&'a BibEntry>; 6],
}

impl<'a> CategorizedEntries<'a> {
    pub fn get(&self, category: Category) -> &[&'a BibEntry] {
        &self.groups[category.index()]
    }

    /// Iterates `(category, entries)` in display order, empty groups included.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[&'a BibEntry])> + '_ {
        Category::DISPLAY_ORDER
            .into_iter()
            .map(move |c| (c, self.get(c)))
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }
}

/// Groups entries by category, keeping the input order within each group.
pub fn classify<'a, I>(entries: I) -> CategorizedEntries<'a>
where
    I: IntoIterator<Item = &'a BibEntry>,
{
    let mut categorized = CategorizedEntries::default();
    for entry in entries {
        let category = Category::from_type_tag(&entry.entry_type);
        categorized.groups[category.index()].push(entry);
    }
    categorized
}

/// Stable sort by lower-cased title; a missing title sorts as the empty string.
pub fn sort_category<'a>(entries: &[&'a BibEntry]) -> Vec<&'a BibEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_cached_key(|e| e.title().unwrap_or_default().to_lowercase());
    sorted
}

/// Applies [`sort_category`] to every group independently.
pub fn sort_all<'a>(categorized: CategorizedEntries<'a>) -> CategorizedEntries<'a> {
    CategorizedEntries {
        groups: categorized.groups.map(|group| sort_category(&group)),
    }
}
