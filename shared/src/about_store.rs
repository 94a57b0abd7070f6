//! The about-page document: profile fields plus the timeline and project
//! collections nested inside it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob_store::{keys, BlobStore};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    Education,
    Work,
    Achievement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    pub year: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TimelineKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutData {
    pub introduction: String,
    pub avatar: String,
    pub background_image: String,
    pub name: String,
    pub title: String,
    pub location: String,
    pub email: String,
    pub skills: Vec<String>,
    pub timeline: Vec<TimelineItem>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutPatch {
    pub introduction: Option<String>,
    pub avatar: Option<String>,
    pub background_image: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub skills: Option<Vec<String>>,
    pub timeline: Option<Vec<TimelineItem>>,
    pub projects: Option<Vec<Project>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItemInput {
    pub year: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TimelineKind,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItemPatch {
    pub year: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TimelineKind>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: Option<bool>,
    pub content: Option<String>,
}

#[derive(Clone)]
pub struct AboutStore {
    blob: BlobStore,
}

impl AboutStore {
    pub fn new(blob: BlobStore) -> Self {
        Self { blob }
    }

    async fn load(&self) -> AboutData {
        self.blob
            .get_or_init(keys::ABOUT, default_about_data())
            .await
            .value
    }

    async fn save(&self, about: &AboutData) {
        self.blob.write(keys::ABOUT, about).await;
    }

    pub async fn get(&self) -> AboutData {
        self.load().await
    }

    /// Shallow-merge the patch over the stored document. A present field
    /// replaces the stored one wholesale, collections included.
    pub async fn merge(&self, patch: AboutPatch) -> AboutData {
        let mut about = self.load().await;
        if let Some(introduction) = patch.introduction {
            about.introduction = introduction;
        }
        if let Some(avatar) = patch.avatar {
            about.avatar = avatar;
        }
        if let Some(background_image) = patch.background_image {
            about.background_image = background_image;
        }
        if let Some(name) = patch.name {
            about.name = name;
        }
        if let Some(title) = patch.title {
            about.title = title;
        }
        if let Some(location) = patch.location {
            about.location = location;
        }
        if let Some(email) = patch.email {
            about.email = email;
        }
        if let Some(skills) = patch.skills {
            about.skills = skills;
        }
        if let Some(timeline) = patch.timeline {
            about.timeline = timeline;
        }
        if let Some(projects) = patch.projects {
            about.projects = projects;
        }
        self.save(&about).await;
        about
    }

    pub async fn add_timeline_item(&self, input: TimelineItemInput) -> AboutData {
        let mut about = self.load().await;
        about.timeline.push(TimelineItem {
            id: Uuid::new_v4().to_string(),
            year: input.year,
            title: input.title,
            description: input.description,
            kind: input.kind,
        });
        sort_timeline(&mut about.timeline);
        self.save(&about).await;
        about
    }

    pub async fn update_timeline_item(
        &self,
        id: &str,
        patch: TimelineItemPatch,
    ) -> StoreResult<AboutData> {
        let mut about = self.load().await;
        let item = about
            .timeline
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(StoreError::NotFound("timeline item"))?;
        if let Some(year) = patch.year {
            item.year = year;
        }
        if let Some(title) = patch.title {
            item.title = title;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(kind) = patch.kind {
            item.kind = kind;
        }
        sort_timeline(&mut about.timeline);
        self.save(&about).await;
        Ok(about)
    }

    /// Removing an id that is not present is a no-op, not an error.
    pub async fn remove_timeline_item(&self, id: &str) -> AboutData {
        let mut about = self.load().await;
        about.timeline.retain(|item| item.id != id);
        self.save(&about).await;
        about
    }

    pub async fn add_project(&self, input: ProjectInput) -> AboutData {
        let mut about = self.load().await;
        about.projects.push(Project {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            image: input.image,
            technologies: input.technologies,
            demo_url: input.demo_url,
            github_url: input.github_url,
            featured: input.featured,
            content: input.content,
        });
        self.save(&about).await;
        about
    }

    pub async fn update_project(&self, id: &str, patch: ProjectPatch) -> StoreResult<AboutData> {
        let mut about = self.load().await;
        let project = about
            .projects
            .iter_mut()
            .find(|project| project.id == id)
            .ok_or(StoreError::NotFound("project"))?;
        if let Some(title) = patch.title {
            project.title = title;
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        if let Some(image) = patch.image {
            project.image = image;
        }
        if let Some(technologies) = patch.technologies {
            project.technologies = technologies;
        }
        if let Some(demo_url) = patch.demo_url {
            project.demo_url = Some(demo_url);
        }
        if let Some(github_url) = patch.github_url {
            project.github_url = Some(github_url);
        }
        if let Some(featured) = patch.featured {
            project.featured = featured;
        }
        if let Some(content) = patch.content {
            project.content = Some(content);
        }
        self.save(&about).await;
        Ok(about)
    }

    /// Removing an id that is not present is a no-op, not an error.
    pub async fn remove_project(&self, id: &str) -> AboutData {
        let mut about = self.load().await;
        about.projects.retain(|project| project.id != id);
        self.save(&about).await;
        about
    }
}

/// Newest first; years that fail to parse sort as year zero. `sort_by_key`
/// is stable, so items sharing a year keep their relative order.
fn sort_timeline(timeline: &mut [TimelineItem]) {
    timeline.sort_by_key(|item| std::cmp::Reverse(parse_year(&item.year)));
}

fn parse_year(year: &str) -> i64 {
    year.trim().parse().unwrap_or(0)
}

fn default_about_data() -> AboutData {
    AboutData {
        introduction: "<p>Hi, I'm Nova. I write about machine learning, side projects, and the small experiments that make everyday life more interesting.</p>".to_string(),
        avatar: "/images/avatar.jpg".to_string(),
        background_image: "/images/about-bg.jpg".to_string(),
        name: "Nova".to_string(),
        title: "AI explorer / life logger".to_string(),
        location: "Shanghai, China".to_string(),
        email: "hello@example.com".to_string(),
        skills: vec![
            "Machine learning".to_string(),
            "Python".to_string(),
            "Rust".to_string(),
            "Technical writing".to_string(),
            "Photography".to_string(),
        ],
        timeline: vec![
            TimelineItem {
                id: "1".to_string(),
                year: "2024".to_string(),
                title: "Started this blog".to_string(),
                description: "Opened a corner of the internet for notes on AI and daily life."
                    .to_string(),
                kind: TimelineKind::Achievement,
            },
            TimelineItem {
                id: "2".to_string(),
                year: "2023".to_string(),
                title: "Machine learning engineer".to_string(),
                description: "Joined an applied research team building retrieval systems."
                    .to_string(),
                kind: TimelineKind::Work,
            },
            TimelineItem {
                id: "3".to_string(),
                year: "2022".to_string(),
                title: "First production model".to_string(),
                description: "Took a recommendation model from notebook to serving.".to_string(),
                kind: TimelineKind::Achievement,
            },
            TimelineItem {
                id: "4".to_string(),
                year: "2020".to_string(),
                title: "M.Sc. in computer science".to_string(),
                description: "Graduated with a focus on natural language processing.".to_string(),
                kind: TimelineKind::Education,
            },
        ],
        projects: vec![
            Project {
                id: "1".to_string(),
                title: "Reading notes assistant".to_string(),
                description: "Turns book highlights into spaced-repetition review cards."
                    .to_string(),
                image: "/images/projects/notes.jpg".to_string(),
                technologies: vec![
                    "Python".to_string(),
                    "FastAPI".to_string(),
                    "SQLite".to_string(),
                ],
                demo_url: Some("https://example.com/reading-notes".to_string()),
                github_url: None,
                featured: true,
                content: Some(
                    "<p>Built to scratch my own itch: capture highlights, review them on a schedule, keep what sticks.</p>"
                        .to_string(),
                ),
            },
            Project {
                id: "2".to_string(),
                title: "Photo map".to_string(),
                description: "Plots ten years of geotagged photos on an interactive map."
                    .to_string(),
                image: "/images/projects/photo-map.jpg".to_string(),
                technologies: vec!["TypeScript".to_string(), "Leaflet".to_string()],
                demo_url: None,
                github_url: None,
                featured: false,
                content: None,
            },
        ],
    }
}
