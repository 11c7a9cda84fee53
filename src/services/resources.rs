// src/services/resources.rs
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CampusResource {
    pub title: &'static str,
    pub website: Option<&'static str>,
    pub phone: Option<&'static str>,
    pub description: Option<&'static str>,
}

impl CampusResource {
    const fn new(title: &'static str) -> Self {
        Self {
            title,
            website: None,
            phone: None,
            description: None,
        }
    }

    const fn website(mut self, website: &'static str) -> Self {
        self.website = Some(website);
        self
    }

    const fn phone(mut self, phone: &'static str) -> Self {
        self.phone = Some(phone);
        self
    }

    const fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn website_url(&self) -> Option<String> {
        self.website.map(|w| format!("https://{w}"))
    }

    /// `tel:` link built from the digits of the displayed number.
    pub fn phone_uri(&self) -> Option<String> {
        self.phone
            .map(|p| format!("tel:{}", p.chars().filter(char::is_ascii_digit).collect::<String>()))
    }
}

pub static CAMPUS_RESOURCES: [CampusResource; 7] = [
    CampusResource::new("University Health Services (UHS)")
        .website("studentaffairs.psu.edu/health")
        .phone("814-865-4UHS (4847)"),
    CampusResource::new("Health Promotion & Wellness")
        .website("studentaffairs.psu.edu/health-promotion")
        .phone("814-863-0461"),
    CampusResource::new("Counseling & Psychological Services (CAPS)")
        .website("studentaffairs.psu.edu/counseling")
        .phone("814-863-0395"),
    CampusResource::new("Crisis Services (24/7)").phone("877-229-6400"),
    CampusResource::new("Crisis Text Line").description("Text \"LIONS\" to 741741"),
    CampusResource::new("Campus Recreation")
        .website("studentaffairs.psu.edu/campusrec")
        .phone("814-867-1600"),
    CampusResource::new("Penn State Learning")
        .website("pennstatelearning.psu.edu/")
        .phone("814-865-2582"),
];

/// A resource with its links resolved, as handed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceView {
    #[serde(flatten)]
    pub resource: CampusResource,
    pub website_url: Option<String>,
    pub phone_uri: Option<String>,
}

pub fn directory() -> Vec<ResourceView> {
    CAMPUS_RESOURCES
        .iter()
        .map(|r| ResourceView {
            resource: *r,
            website_url: r.website_url(),
            phone_uri: r.phone_uri(),
        })
        .collect()
}
