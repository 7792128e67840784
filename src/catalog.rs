// Resource catalog - static sample data browsed by the dashboard
//
// Category -> item -> sub-entry. Nothing here talks to a storage backend.

/// A top-level resource category (Containers, Queues, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub items: Vec<Item>,
}

/// An item inside a category, e.g. a blob container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: &'static str,
    /// Blobs, messages, files or rows; may be empty
    pub entries: Vec<&'static str>,
}

impl Item {
    fn new(name: &'static str, entries: &[&'static str]) -> Self {
        Self {
            name,
            entries: entries.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// The sample data shown when browsing the emulator
    pub fn sample() -> Self {
        Self::new(vec![
            Category {
                name: "Containers",
                items: vec![
                    Item::new("images", &["cat.png", "dog.jpg", "sunset.png"]),
                    Item::new("videos", &["intro.mp4", "trailer.mov"]),
                    Item::new("backups", &[]),
                ],
            },
            Category {
                name: "Queues",
                items: vec![Item::new("email-jobs", &[]), Item::new("task-queue", &[])],
            },
            Category {
                name: "File Shares",
                items: vec![Item::new("projectA", &[]), Item::new("projectB", &[])],
            },
            Category {
                name: "Tables",
                items: vec![
                    Item::new("users", &["alice", "bob", "charlie"]),
                    Item::new("transactions", &[]),
                ],
            },
        ])
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn category(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    pub fn item(&self, category: usize, item: usize) -> Option<&Item> {
        self.category(category).and_then(|c| c.items.get(item))
    }

    /// Number of items in a category (0 if out of range)
    pub fn item_count(&self, category: usize) -> usize {
        self.category(category).map_or(0, |c| c.items.len())
    }

    /// Number of sub-entries of an item (0 if out of range)
    pub fn entry_count(&self, category: usize, item: usize) -> usize {
        self.item(category, item).map_or(0, |i| i.entries.len())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::sample()
    }
}
