//! Subjects and chapters offered by the course catalog.

/// Label used when a quiz topic does not match any configured chapter.
pub const UNCATEGORIZED: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub name: &'static str,
    pub chapters: &'static [&'static str],
}

pub const SUBJECTS: &[Subject] = &[
    Subject {
        name: "Mathematics",
        chapters: &[
            "Algebra Basics",
            "Geometry Fundamentals",
            "Introduction to Calculus",
            "Statistics and Probability",
        ],
    },
    Subject {
        name: "History",
        chapters: &[
            "Ancient Civilizations",
            "The Roman Empire",
            "The Middle Ages",
            "The Renaissance",
        ],
    },
    Subject {
        name: "Science",
        chapters: &[
            "Photosynthesis",
            "The Solar System",
            "Chemical Reactions",
            "Newton's Laws of Motion",
        ],
    },
    Subject {
        name: "Literature",
        chapters: &[
            "Shakespearean Tragedies",
            "Modernist Poetry",
            "The Lost Generation",
            "Post-colonial Literature",
        ],
    },
];

/// Name of the first subject in `subjects` that lists `topic` as a chapter.
pub fn resolve_subject_in(subjects: &[Subject], topic: &str) -> String {
    subjects
        .iter()
        .find(|s| s.chapters.contains(&topic))
        .map(|s| s.name.to_string())
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

pub fn resolve_subject(topic: &str) -> String {
    resolve_subject_in(SUBJECTS, topic)
}

/// Every (subject, chapter) pair in catalog order.
pub fn all_chapters() -> impl Iterator<Item = (&'static str, &'static str)> {
    SUBJECTS
        .iter()
        .flat_map(|s| s.chapters.iter().map(move |c| (s.name, *c)))
}
