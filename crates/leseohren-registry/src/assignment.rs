//! Assignment service: maintains the volunteer roster of organizations.
//!
//! Every change goes through a per-organization async lock and touches a
//! single roster edge. Successful changes emit exactly one
//! [`RosterChanged`]; no-ops emit nothing.

use std::sync::Arc;

use dashmap::DashMap;
use leseohren_core::error::{RegistryError, RegistryResult};
use leseohren_core::events::{RosterChanged, RosterListener};
use leseohren_core::models::organization::Organization;
use leseohren_core::models::person::Person;
use leseohren_core::repository::OrganizationRepository;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Result of a roster change request.
///
/// `AlreadyAssigned` and `NotAssigned` are expected outcomes of repeated
/// requests, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignmentOutcome {
    Assigned,
    AlreadyAssigned,
    Removed,
    NotAssigned,
}

impl AssignmentOutcome {
    /// Whether the roster was mutated.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Assigned | Self::Removed)
    }
}

/// Roster assignment service.
///
/// Generic over the repository and the listener so that it has no
/// dependency on the database crate or a cache backend.
pub struct AssignmentService<O: OrganizationRepository, L: RosterListener> {
    organizations: O,
    listener: L,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl<O: OrganizationRepository, L: RosterListener> AssignmentService<O, L> {
    pub fn new(organizations: O, listener: L) -> Self {
        Self {
            organizations,
            listener,
            locks: DashMap::new(),
        }
    }

    /// Add a person to an organization's roster.
    pub async fn assign_volunteer(
        &self,
        organization_id: Uuid,
        person_id: Uuid,
    ) -> RegistryResult<AssignmentOutcome> {
        let lock = self.lock_for(organization_id);
        let guard = lock.lock().await;

        let result = match self
            .organizations
            .add_volunteer(organization_id, person_id)
            .await
        {
            Ok(true) => Ok(AssignmentOutcome::Assigned),
            Ok(false) => Ok(AssignmentOutcome::AlreadyAssigned),
            // Another process may have inserted the same edge between our
            // check and insert; the unique index rejects the second one.
            Err(RegistryError::Database(reason)) => match self
                .organizations
                .is_volunteer(organization_id, person_id)
                .await
            {
                Ok(true) => Ok(AssignmentOutcome::AlreadyAssigned),
                Ok(false) => Err(RegistryError::Database(reason)),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        drop(guard);
        drop(lock);
        self.release_lock(organization_id);

        self.finish(organization_id, person_id, result?).await
    }

    /// Remove a person from an organization's roster.
    pub async fn remove_volunteer(
        &self,
        organization_id: Uuid,
        person_id: Uuid,
    ) -> RegistryResult<AssignmentOutcome> {
        let lock = self.lock_for(organization_id);
        let guard = lock.lock().await;

        let result = self
            .organizations
            .remove_volunteer(organization_id, person_id)
            .await
            .map(|removed| {
                if removed {
                    AssignmentOutcome::Removed
                } else {
                    AssignmentOutcome::NotAssigned
                }
            });

        drop(guard);
        drop(lock);
        self.release_lock(organization_id);

        self.finish(organization_id, person_id, result?).await
    }

    /// Volunteers of an organization ordered by (lastname, firstname).
    pub async fn roster(&self, organization_id: Uuid) -> RegistryResult<Vec<Person>> {
        self.organizations.get_volunteers(organization_id).await
    }

    /// Organizations a person volunteers for, ordered by name.
    pub async fn organizations_of(&self, person_id: Uuid) -> RegistryResult<Vec<Organization>> {
        self.organizations.get_person_organizations(person_id).await
    }

    async fn finish(
        &self,
        organization_id: Uuid,
        person_id: Uuid,
        outcome: AssignmentOutcome,
    ) -> RegistryResult<AssignmentOutcome> {
        if outcome.changed() {
            info!(%organization_id, %person_id, ?outcome, "Roster changed");
            self.listener
                .on_roster_changed(RosterChanged { organization_id })
                .await;
        } else {
            debug!(%organization_id, %person_id, ?outcome, "Roster unchanged");
        }
        Ok(outcome)
    }

    fn lock_for(&self, organization_id: Uuid) -> Arc<Mutex<()>> {
        self.locks.entry(organization_id).or_default().clone()
    }

    /// Drops the lock entry once no request holds or awaits it.
    fn release_lock(&self, organization_id: Uuid) {
        self.locks
            .remove_if(&organization_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
