// src/templates.rs
use crate::{
    error::AppResult,
    models::{
        content::{Event, NewsArticle},
        faculty,
        gallery::GalleryImage,
        payment::Payment,
        profile::{Profile, ProfileState},
    },
    web::page::NavContext,
};
use askama::Template;
use axum::response::Html;

pub fn render<T: Template>(page: &T) -> AppResult<Html<String>> {
    Ok(Html(page.render()?))
}

/// One `<option>` of a select, with the selection worked out in Rust.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn list<'a>(values: impl IntoIterator<Item = &'a str>, selected: Option<&str>) -> Vec<Self> {
        values
            .into_iter()
            .map(|value| SelectOption { value: value.to_string(), selected: Some(value) == selected })
            .collect()
    }

    pub fn faculties(selected: Option<&str>) -> Vec<Self> {
        Self::list(faculty::faculty_names(), selected)
    }

    /// Departments of `faculty` only; empty when no faculty is chosen.
    pub fn departments(faculty: Option<&str>, selected: Option<&str>) -> Vec<Self> {
        Self::list(faculty::departments_of(faculty.unwrap_or("")).iter().copied(), selected)
    }
}

/// A faculty with its departments, for grouped selects.
#[derive(Debug, Clone)]
pub struct FacultyGroup {
    pub name: &'static str,
    pub departments: Vec<SelectOption>,
}

impl FacultyGroup {
    pub fn all(selected_department: Option<&str>, selected_faculty: Option<&str>) -> Vec<Self> {
        faculty::FACULTIES
            .iter()
            .map(|(name, departments)| FacultyGroup {
                name: *name,
                departments: SelectOption::list(
                    departments.iter().copied(),
                    selected_department.filter(|_| selected_faculty == Some(*name)),
                ),
            })
            .collect()
    }
}

// --- Public pages ---

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub nav: NavContext,
    pub events: Vec<Event>,
    pub news: Vec<NewsArticle>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub nav: NavContext,
    pub admin: bool,
    pub email: String,
    pub error: Option<String>,
}

impl LoginPage {
    pub fn new(nav: NavContext, admin: bool) -> Self {
        Self { nav, admin, email: String::new(), error: None }
    }

    pub fn action(&self) -> &'static str {
        if self.admin { "/admin/login" } else { "/login" }
    }

    pub fn heading(&self) -> &'static str {
        if self.admin { "Admin Login" } else { "Alumni Login" }
    }
}

#[derive(Template, Default)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub nav: NavContext,
    pub error: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub matriculation_number: String,
    pub graduation_date: String,
}

#[derive(Template)]
#[template(path = "verification.html")]
pub struct VerificationPage {
    pub nav: NavContext,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundPage {
    pub nav: NavContext,
    pub path: String,
}

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsPage {
    pub nav: NavContext,
    pub upcoming: Vec<Event>,
    pub past: Vec<Event>,
}

#[derive(Template)]
#[template(path = "news.html")]
pub struct NewsPage {
    pub nav: NavContext,
    pub articles: Vec<NewsArticle>,
}

// --- Alumni pages ---

#[derive(Template)]
#[template(path = "alumni_dashboard.html")]
pub struct AlumniDashboardPage {
    pub nav: NavContext,
    pub profile: Profile,
    pub state: ProfileState,
    pub upcoming: Vec<Event>,
    pub news: Vec<NewsArticle>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    pub nav: NavContext,
    pub profile: Profile,
    pub state: ProfileState,
    pub faculties: Vec<SelectOption>,
    pub department_groups: Vec<FacultyGroup>,
    pub max_avatar_kb: usize,
}

#[derive(Template)]
#[template(path = "directory.html")]
pub struct DirectoryPage {
    pub nav: NavContext,
    pub alumni: Vec<Profile>,
    pub total: usize,
    pub name: String,
    pub graduation_year: String,
    pub faculties: Vec<SelectOption>,
    pub departments: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "payments.html")]
pub struct PaymentsPage {
    pub nav: NavContext,
    pub payments: Vec<Payment>,
    pub payment_types: Vec<SelectOption>,
    pub min_amount: i64,
}

#[derive(Template)]
#[template(path = "gallery.html")]
pub struct GalleryPage {
    pub nav: NavContext,
    pub images: Vec<GalleryImage>,
    pub categories: Vec<SelectOption>,
    pub q: String,
}

// --- Admin pages ---

#[derive(Template)]
#[template(path = "admin_dashboard.html")]
pub struct AdminDashboardPage {
    pub nav: NavContext,
    pub alumni_count: usize,
    pub events_count: usize,
    pub news_count: usize,
    pub payments_count: i64,
    pub latest_alumni: Vec<Profile>,
    pub recent_payments: Vec<Payment>,
}

#[derive(Template)]
#[template(path = "admin_panel.html")]
pub struct AdminPanelPage {
    pub nav: NavContext,
}

#[derive(Template)]
#[template(path = "admin_alumni.html")]
pub struct AdminAlumniPage {
    pub nav: NavContext,
    pub alumni: Vec<Profile>,
    pub q: String,
    pub faculties: Vec<SelectOption>,
    pub department_groups: Vec<FacultyGroup>,
}

#[derive(Template)]
#[template(path = "admin_alumni_edit.html")]
pub struct AdminAlumniEditPage {
    pub nav: NavContext,
    pub profile: Profile,
    pub faculties: Vec<SelectOption>,
    pub department_groups: Vec<FacultyGroup>,
}

/// Event list plus a form that either creates or, with `editing`, updates.
#[derive(Template)]
#[template(path = "admin_events.html")]
pub struct AdminEventsPage {
    pub nav: NavContext,
    pub events: Vec<Event>,
    pub editing: Option<Event>,
}

impl AdminEventsPage {
    pub fn form_action(&self) -> String {
        match &self.editing {
            Some(event) => format!("/admin/panel/events/{}", event.id),
            None => "/admin/panel/events".to_string(),
        }
    }

    pub fn title_value(&self) -> &str {
        self.editing.as_ref().map_or("", |e| e.title.as_str())
    }

    pub fn description_value(&self) -> &str {
        self.editing.as_ref().map_or("", |e| e.description.as_str())
    }

    pub fn date_value(&self) -> String {
        self.editing.as_ref().map(Event::date_input).unwrap_or_default()
    }

    pub fn location_value(&self) -> &str {
        self.editing.as_ref().map_or("", Event::location_or_empty)
    }

    pub fn image_value(&self) -> &str {
        self.editing.as_ref().map_or("", Event::image_or_empty)
    }
}

#[derive(Template)]
#[template(path = "admin_news.html")]
pub struct AdminNewsPage {
    pub nav: NavContext,
    pub articles: Vec<NewsArticle>,
    pub editing: Option<NewsArticle>,
}

impl AdminNewsPage {
    pub fn form_action(&self) -> String {
        match &self.editing {
            Some(article) => format!("/admin/panel/news/{}", article.id),
            None => "/admin/panel/news".to_string(),
        }
    }

    pub fn title_value(&self) -> &str {
        self.editing.as_ref().map_or("", |a| a.title.as_str())
    }

    pub fn content_value(&self) -> &str {
        self.editing.as_ref().map_or("", |a| a.content.as_str())
    }

    pub fn date_value(&self) -> String {
        self.editing.as_ref().map(NewsArticle::date_input).unwrap_or_default()
    }

    pub fn image_value(&self) -> &str {
        self.editing.as_ref().map_or("", NewsArticle::image_or_empty)
    }
}

#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeletePage {
    pub nav: NavContext,
    pub kind: &'static str,
    pub label: String,
    pub action: String,
    pub cancel: &'static str,
}
