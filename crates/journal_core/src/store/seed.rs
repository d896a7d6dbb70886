//! Built-in sample dataset used when no persisted snapshot is usable.
//!
//! The dataset is fixed: three volumes, three authors, one paper per volume.
//! Every call returns identical records.

use crate::model::author::Author;
use crate::model::paper::Paper;
use crate::model::volume::Volume;

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

pub fn seed_volumes() -> Vec<Volume> {
    vec![
        Volume::new(
            "v1",
            "Advances in Quantum Computing",
            1,
            2023,
            10,
            "This volume explores recent advancements in quantum computing algorithms and hardware implementations.",
        ),
        Volume::new(
            "v2",
            "Artificial Intelligence Applications",
            2,
            2023,
            11,
            "A collection of papers on practical applications of AI in healthcare, finance, and education.",
        ),
        Volume::new(
            "v3",
            "Sustainable Energy Technologies",
            3,
            2023,
            12,
            "Research on renewable energy sources and sustainable technology implementations.",
        ),
    ]
}

pub fn seed_authors() -> Vec<Author> {
    vec![
        seed_author(
            "a1",
            "Dr. Jane Smith",
            "MIT",
            "Quantum computing researcher with focus on error correction.",
        ),
        seed_author(
            "a2",
            "Prof. John Davis",
            "Stanford University",
            "AI ethics and implementation specialist.",
        ),
        seed_author(
            "a3",
            "Dr. Sarah Johnson",
            "Oxford University",
            "Specialist in renewable energy systems and grid optimization.",
        ),
    ]
}

pub fn seed_papers() -> Vec<Paper> {
    let authors = seed_authors();
    vec![
        seed_paper(
            Paper::new(
                "p1",
                "Quantum Error Correction in NISQ Devices",
                "This paper presents a novel approach to quantum error correction suitable for Noisy Intermediate-Scale Quantum (NISQ) devices that requires fewer physical qubits than traditional methods.",
                "v1",
                "2023-10-15",
            ),
            &authors[0],
            &["quantum computing", "error correction", "NISQ"],
            "Nielsen, M. A., & Chuang, I. L. (2010). Quantum Computation and Quantum Information.",
        ),
        seed_paper(
            Paper::new(
                "p2",
                "Ethical Considerations in Healthcare AI Implementation",
                "We examine the ethical challenges that arise when implementing AI systems in healthcare settings, proposing a framework for responsible deployment.",
                "v2",
                "2023-11-10",
            ),
            &authors[1],
            &["artificial intelligence", "healthcare", "ethics"],
            "Beauchamp, T. L., & Childress, J. F. (2001). Principles of Biomedical Ethics.",
        ),
        seed_paper(
            Paper::new(
                "p3",
                "Grid-Scale Energy Storage Technologies: A Comparative Analysis",
                "This paper compares various grid-scale energy storage technologies, evaluating their efficiency, cost, and environmental impact in different deployment scenarios.",
                "v3",
                "2023-12-05",
            ),
            &authors[2],
            &["energy storage", "renewable energy", "grid optimization"],
            "Ibrahim, H., Ilinca, A., & Perron, J. (2008). Energy storage systems\u{2014}Characteristics and comparisons.",
        ),
    ]
}

fn seed_author(id: &str, name: &str, affiliation: &str, bio: &str) -> Author {
    Author {
        id: id.to_string(),
        name: name.to_string(),
        affiliation: affiliation.to_string(),
        bio: bio.to_string(),
        photo: PLACEHOLDER_IMAGE.to_string(),
    }
}

fn seed_paper(mut paper: Paper, author: &Author, keywords: &[&str], reference: &str) -> Paper {
    paper.authors.push(author.clone());
    paper.keywords = keywords.iter().map(|keyword| keyword.to_string()).collect();
    paper.references.push(reference.to_string());
    paper.image = Some(PLACEHOLDER_IMAGE.to_string());
    paper
}

#[cfg(test)]
mod tests {
    use super::{seed_papers, seed_volumes};

    #[test]
    fn seed_records_are_valid_and_linked() {
        let volumes = seed_volumes();
        for volume in &volumes {
            volume.validate().unwrap();
        }
        for paper in seed_papers() {
            paper.validate().unwrap();
            assert!(volumes.iter().any(|volume| volume.id == paper.volume_id));
        }
    }

    #[test]
    fn seed_is_deterministic() {
        assert_eq!(seed_papers(), seed_papers());
        assert_eq!(seed_volumes(), seed_volumes());
    }
}
