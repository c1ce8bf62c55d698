use super::IProfileRepo;
use crate::repos::shared::inmemory_repo::*;
use taskflow_domain::{Profile, ID};

pub struct InMemoryProfileRepo {
    profiles: std::sync::Mutex<Vec<Profile>>,
}

impl InMemoryProfileRepo {
    pub fn new() -> Self {
        Self {
            profiles: std::sync::Mutex::new(vec![]),
        }
    }
}

impl Default for InMemoryProfileRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IProfileRepo for InMemoryProfileRepo {
    async fn insert(&self, profile: &Profile) -> anyhow::Result<()> {
        insert(profile, &self.profiles);
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Option<Profile>> {
        Ok(find_by(&self.profiles, |p| p.user_id == *user_id)
            .into_iter()
            .next())
    }
}
