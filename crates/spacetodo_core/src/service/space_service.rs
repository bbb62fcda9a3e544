//! Space and list use-case service.
//!
//! # Invariants
//! - Slugs follow the slug grammar before they reach storage.
//! - Lists are created only inside existing spaces.
//! - Private lists are returned to their owner only.

use crate::model::space::{validate_slug, List, NewList, Space};
use crate::model::{require_text, ValidationError};
use crate::repo::space_repo::SpaceRepository;
use crate::repo::RepoError;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SpaceServiceError {
    Invalid(ValidationError),
    SlugTaken(String),
    /// Carries the id or slug used for the lookup.
    SpaceNotFound(String),
    Repo(RepoError),
}

impl Display for SpaceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::SlugTaken(slug) => write!(f, "space slug already taken: {slug}"),
            Self::SpaceNotFound(key) => write!(f, "space not found: {key}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SpaceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for SpaceServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<RepoError> for SpaceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Duplicate {
                entity: "space",
                key,
            } => Self::SlugTaken(key),
            other => Self::Repo(other),
        }
    }
}

/// Space summary for overview screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceCard {
    #[serde(flatten)]
    pub space: Space,
    pub list_count: u32,
}

/// Space/list service facade over repository implementations.
pub struct SpaceService<R: SpaceRepository> {
    repo: R,
}

impl<R: SpaceRepository> SpaceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a space after slug/name validation.
    pub fn create_space(&self, slug: &str, name: &str) -> Result<Space, SpaceServiceError> {
        let slug = slug.trim();
        validate_slug(slug)?;
        let name = require_text("name", name)?;
        let space = self.repo.create_space(slug, name)?;
        info!("event=space_create module=service status=ok");
        Ok(space)
    }

    pub fn get_space_by_slug(&self, slug: &str) -> Result<Option<Space>, SpaceServiceError> {
        Ok(self.repo.get_space_by_slug(slug.trim())?)
    }

    /// Lists spaces by name with their list counts.
    pub fn list_space_cards(&self) -> Result<Vec<SpaceCard>, SpaceServiceError> {
        let spaces = self.repo.list_spaces()?;
        let mut cards = Vec::with_capacity(spaces.len());
        for space in spaces {
            let list_count = self.repo.count_lists(&space.id)?;
            cards.push(SpaceCard { space, list_count });
        }
        Ok(cards)
    }

    /// Creates a list inside an existing space.
    pub fn create_list(
        &self,
        space_id: &str,
        owner_id: &str,
        title: &str,
        private: bool,
    ) -> Result<List, SpaceServiceError> {
        let space_id = require_text("space_id", space_id)?;
        let owner_id = require_text("owner_id", owner_id)?;
        let title = require_text("title", title)?;
        if self.repo.get_space(space_id)?.is_none() {
            return Err(SpaceServiceError::SpaceNotFound(space_id.to_string()));
        }

        let list = self.repo.create_list(&NewList {
            space_id: space_id.to_string(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            private,
        })?;
        info!(
            "event=list_create module=service status=ok private={}",
            list.private
        );
        Ok(list)
    }

    pub fn get_list(&self, list_id: &str) -> Result<Option<List>, SpaceServiceError> {
        Ok(self.repo.get_list(list_id)?)
    }

    /// Lists the lists of the space addressed by `slug` that `viewer_id` may
    /// see, most recently updated first.
    pub fn list_lists(&self, slug: &str, viewer_id: &str) -> Result<Vec<List>, SpaceServiceError> {
        let space = self
            .repo
            .get_space_by_slug(slug.trim())?
            .ok_or_else(|| SpaceServiceError::SpaceNotFound(slug.to_string()))?;
        let mut lists = self.repo.list_lists(&space.id)?;
        lists.retain(|list| list.is_visible_to(viewer_id));
        Ok(lists)
    }

    pub fn count_lists(&self, space_id: &str) -> Result<u32, SpaceServiceError> {
        Ok(self.repo.count_lists(space_id)?)
    }
}
