/// Content types shown in the studio, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ContentType {
    pub name: &'static str,
    pub title: &'static str,
    /// Singletons have exactly one document and no create button.
    pub singleton: bool,
}

pub static CONTENT_TYPES: [ContentType; 7] = [
    ContentType { name: "page", title: "Pagina's", singleton: false },
    ContentType { name: "newsPost", title: "Nieuws", singleton: false },
    ContentType { name: "buurtActie", title: "Buurt acties", singleton: false },
    ContentType { name: "gallery", title: "Galerij", singleton: false },
    ContentType { name: "registration", title: "Inschrijvingen", singleton: false },
    ContentType { name: "siteSettings", title: "Site-instellingen", singleton: true },
    ContentType { name: "navigation", title: "Navigatie", singleton: true },
];

pub fn content_type(name: &str) -> Option<&'static ContentType> {
    CONTENT_TYPES.iter().find(|t| t.name == name)
}
