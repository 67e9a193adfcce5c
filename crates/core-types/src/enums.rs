use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;

/// The five tables of the bookstore schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Publisher,
    Book,
    Shop,
    Stock,
    Sale,
}

impl EntityKind {
    /// Parents before children. Inserting in this order never breaks a foreign key.
    pub const LOAD_ORDER: [EntityKind; 5] = [
        EntityKind::Publisher,
        EntityKind::Book,
        EntityKind::Shop,
        EntityKind::Stock,
        EntityKind::Sale,
    ];

    /// Children before parents, for wiping the tables.
    pub const DELETE_ORDER: [EntityKind; 5] = [
        EntityKind::Sale,
        EntityKind::Stock,
        EntityKind::Book,
        EntityKind::Shop,
        EntityKind::Publisher,
    ];

    /// The SQL table backing this entity.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Publisher => "publisher",
            EntityKind::Book => "book",
            EntityKind::Shop => "shop",
            EntityKind::Stock => "stock",
            EntityKind::Sale => "sale",
        }
    }

    /// The fixture document holding this entity's seed rows.
    pub fn fixture_file_name(&self) -> &'static str {
        match self {
            EntityKind::Publisher => "publisher.json",
            EntityKind::Book => "book.json",
            EntityKind::Shop => "shop.json",
            EntityKind::Stock => "stock.json",
            EntityKind::Sale => "sale.json",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// How the sales query selects publishers.
///
/// Built once from raw user input by [`PublisherFilter::from_input`]; the join
/// logic downstream only ever sees one of these two variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublisherFilter {
    /// Exact match on the publisher's primary key.
    Id(i64),
    /// Case-insensitive substring match on the publisher's name.
    Name(String),
}

impl PublisherFilter {
    /// Anything that looks like an integer is an id, everything else is a name fragment.
    ///
    /// Integers too large for `i64` still count as ids; they are clamped to the
    /// `i64` bounds, which no `INTEGER` key can ever equal.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if !looks_numeric(trimmed) {
            return PublisherFilter::Name(input.to_string());
        }

        let id = match trimmed.parse::<i64>() {
            Ok(id) => id,
            Err(e) => match e.kind() {
                IntErrorKind::NegOverflow => i64::MIN,
                _ => i64::MAX,
            },
        };
        tracing::debug!(id, "Publisher input resolved to an id filter.");
        PublisherFilter::Id(id)
    }

    /// Whether a stored publisher passes this filter.
    pub fn matches(&self, id: i32, name: &str) -> bool {
        match self {
            PublisherFilter::Id(wanted) => i64::from(id) == *wanted,
            PublisherFilter::Name(fragment) => {
                name.to_lowercase().contains(&fragment.to_lowercase())
            }
        }
    }
}

fn looks_numeric(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
