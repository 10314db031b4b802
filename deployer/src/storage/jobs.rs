//! Repository to jobs mapping

use std::collections::HashMap;

use crate::models::job::Job;

/// Resolve which jobs run a given image repository
pub trait JobsRepository: Send + Sync {
    /// Jobs using `image`, in configuration order. Empty for unknown images.
    fn find_jobs_by_image(&self, image: &str) -> Vec<Job>;
}

/// Mapping held in memory, fixed for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobsRepository {
    mapping: HashMap<String, Vec<Job>>,
}

impl InMemoryJobsRepository {
    pub fn new(mapping: HashMap<String, Vec<Job>>) -> Self {
        Self { mapping }
    }

    /// Build the mapping from the `jobs` settings table
    pub fn from_job_names(table: &HashMap<String, Vec<String>>) -> Self {
        let mapping = table
            .iter()
            .map(|(repository, names)| {
                let jobs = names.iter().map(Job::new).collect();
                (repository.clone(), jobs)
            })
            .collect();
        Self { mapping }
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl JobsRepository for InMemoryJobsRepository {
    fn find_jobs_by_image(&self, image: &str) -> Vec<Job> {
        self.mapping.get(image).cloned().unwrap_or_default()
    }
}
