//! Built-in placeholder content shown when neither a snapshot nor live data is available.

use chrono::{DateTime, Utc};
use portfolio_core::{
    Certificate, ContentRecord, Experience, ExperienceDetails, Project, ProjectDetails,
};

/// Record types that ship a fixed placeholder sequence.
pub trait FallbackRecords: Sized {
    fn fallback() -> Vec<Self>;
}

impl FallbackRecords for Project {
    fn fallback() -> Vec<Self> {
        fallback_projects()
    }
}

impl FallbackRecords for Experience {
    fn fallback() -> Vec<Self> {
        fallback_experience()
    }
}

/// Only uploaded certificates are listed, so there is nothing to stand in.
impl FallbackRecords for Certificate {
    fn fallback() -> Vec<Self> {
        Vec::new()
    }
}

fn stamp(date: &str) -> DateTime<Utc> {
    format!("{date}T00:00:00Z").parse().unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

struct ProjectSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
    image: &'static str,
    demo_url: Option<&'static str>,
    repo_url: Option<&'static str>,
    category: &'static str,
    date: &'static str,
}

const PROJECT_SEEDS: &[ProjectSeed] = &[
    ProjectSeed {
        id: "1",
        title: "Network Infrastructure Optimization",
        description: "Comprehensive network redesign for a large enterprise, improving performance by 40% and reducing latency by 60%.",
        tags: &["Cisco", "MPLS", "BGP", "OSPF", "SD-WAN"],
        image: "https://images.pexels.com/photos/2881232/pexels-photo-2881232.jpeg",
        demo_url: None,
        repo_url: None,
        category: "network",
        date: "2024-01-15",
    },
    ProjectSeed {
        id: "2",
        title: "AI-Powered Analytics Dashboard",
        description: "Machine learning dashboard providing real-time insights and predictive analytics for business intelligence.",
        tags: &["Python", "TensorFlow", "React", "D3.js", "PostgreSQL"],
        image: "https://images.pexels.com/photos/7688336/pexels-photo-7688336.jpeg",
        demo_url: Some("https://demo.example.com"),
        repo_url: Some("https://github.com/example"),
        category: "ai",
        date: "2024-02-10",
    },
    ProjectSeed {
        id: "3",
        title: "E-Commerce Platform",
        description: "Full-stack e-commerce solution with modern UI, payment integration, and admin dashboard.",
        tags: &["React", "Node.js", "MongoDB", "Stripe", "AWS"],
        image: "https://images.pexels.com/photos/196644/pexels-photo-196644.jpeg",
        demo_url: Some("https://demo.example.com"),
        repo_url: Some("https://github.com/example"),
        category: "web",
        date: "2024-03-05",
    },
    ProjectSeed {
        id: "4",
        title: "Mobile Network Monitoring System",
        description: "Real-time monitoring system for mobile network infrastructure with automated alerting.",
        tags: &["Java", "Spring Boot", "Kafka", "Elasticsearch", "React"],
        image: "https://images.pexels.com/photos/442150/pexels-photo-442150.jpeg",
        demo_url: None,
        repo_url: None,
        category: "network",
        date: "2024-01-20",
    },
    ProjectSeed {
        id: "5",
        title: "Natural Language Processing API",
        description: "RESTful API for text analysis, sentiment analysis, and entity recognition using transformer models.",
        tags: &["Python", "FastAPI", "Transformers", "Docker", "Redis"],
        image: "https://images.pexels.com/photos/8386440/pexels-photo-8386440.jpeg",
        demo_url: Some("https://api.example.com"),
        repo_url: Some("https://github.com/example"),
        category: "ai",
        date: "2024-02-25",
    },
    ProjectSeed {
        id: "6",
        title: "Portfolio Management System",
        description: "Comprehensive web application for investment portfolio tracking and analysis.",
        tags: &["Vue.js", "Laravel", "MySQL", "Chart.js", "Tailwind CSS"],
        image: "https://images.pexels.com/photos/590022/pexels-photo-590022.jpeg",
        demo_url: Some("https://portfolio.example.com"),
        repo_url: Some("https://github.com/example"),
        category: "web",
        date: "2024-03-15",
    },
];

pub fn fallback_projects() -> Vec<Project> {
    PROJECT_SEEDS
        .iter()
        .map(|seed| ContentRecord {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            tags: strings(seed.tags),
            category: seed.category.to_string(),
            created_at: stamp(seed.date),
            updated_at: Some(stamp(seed.date)),
            details: ProjectDetails {
                image_url: Some(seed.image.to_string()),
                demo_url: seed.demo_url.map(str::to_string),
                repo_url: seed.repo_url.map(str::to_string),
            },
        })
        .collect()
}

struct ExperienceSeed {
    id: &'static str,
    company: &'static str,
    position: &'static str,
    duration: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
    category: &'static str,
    date: &'static str,
}

const EXPERIENCE_SEEDS: &[ExperienceSeed] = &[
    ExperienceSeed {
        id: "1",
        company: "TechCorp Solutions",
        position: "Senior Network Engineer",
        duration: "2022 - Present",
        description: "Leading network infrastructure projects for enterprise clients, specializing in SD-WAN implementations and network security optimization. Managed a team of 5 engineers and delivered solutions that improved network performance by 45%.",
        tags: &["Network Architecture", "SD-WAN", "Cisco", "Security", "Team Leadership"],
        category: "network",
        date: "2024-01-01",
    },
    ExperienceSeed {
        id: "2",
        company: "InnovateAI Labs",
        position: "AI Engineering Consultant",
        duration: "2021 - 2022",
        description: "Developed and deployed machine learning models for various clients, focusing on natural language processing and computer vision applications. Built scalable ML pipelines and reduced model inference time by 60%.",
        tags: &["Python", "TensorFlow", "PyTorch", "NLP", "Computer Vision", "MLOps"],
        category: "ai",
        date: "2024-01-02",
    },
    ExperienceSeed {
        id: "3",
        company: "WebDev Pro",
        position: "Full Stack Developer",
        duration: "2020 - 2021",
        description: "Built modern web applications using React, Node.js, and cloud technologies. Collaborated with cross-functional teams to deliver high-quality solutions for clients in various industries.",
        tags: &["React", "Node.js", "MongoDB", "AWS", "GraphQL", "TypeScript"],
        category: "web",
        date: "2024-01-03",
    },
    ExperienceSeed {
        id: "4",
        company: "NetSecure Systems",
        position: "Network Administrator",
        duration: "2019 - 2020",
        description: "Maintained and optimized network infrastructure for a mid-sized company. Implemented security protocols and monitoring systems that reduced downtime by 30%.",
        tags: &["Network Monitoring", "Firewall Management", "VPN", "Security Protocols"],
        category: "network",
        date: "2024-01-04",
    },
];

pub fn fallback_experience() -> Vec<Experience> {
    EXPERIENCE_SEEDS
        .iter()
        .map(|seed| ContentRecord {
            id: seed.id.to_string(),
            title: format!("{} at {}", seed.position, seed.company),
            description: seed.description.to_string(),
            tags: strings(seed.tags),
            category: seed.category.to_string(),
            created_at: stamp(seed.date),
            updated_at: None,
            details: ExperienceDetails {
                company: seed.company.to_string(),
                position: seed.position.to_string(),
                duration: seed.duration.to_string(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_sequences_are_never_empty_and_dated() {
        let projects = fallback_projects();
        assert_eq!(projects.len(), 6);
        assert!(projects.iter().all(|p| p.created_at.timestamp() > 0));

        let experience = fallback_experience();
        assert_eq!(experience.len(), 4);
        assert_eq!(experience[0].title, "Senior Network Engineer at TechCorp Solutions");
    }
}
