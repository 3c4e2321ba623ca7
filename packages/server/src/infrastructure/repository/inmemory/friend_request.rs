//! InMemory FriendRequest Repository

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    FriendRequest, FriendRequestId, FriendRequestRepository, FriendshipStatus, RepositoryError,
    Timestamp, UserId,
};

#[derive(Default)]
pub struct InMemoryFriendRequestRepository {
    requests: Mutex<HashMap<FriendRequestId, FriendRequest>>,
}

impl InMemoryFriendRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn id_filter(ids: &Option<Vec<FriendRequestId>>, request: &FriendRequest) -> bool {
    match ids {
        Some(ids) if !ids.is_empty() => ids.contains(&request.id),
        _ => true,
    }
}

#[async_trait]
impl FriendRequestRepository for InMemoryFriendRequestRepository {
    async fn insert(&self, request: FriendRequest) -> Result<(), RepositoryError> {
        let mut requests = self.requests.lock().await;
        if requests.contains_key(&request.id) {
            return Err(RepositoryError::Duplicate(request.id.into_string()));
        }
        requests.insert(request.id.clone(), request);
        Ok(())
    }

    async fn update(&self, request: FriendRequest) -> Result<(), RepositoryError> {
        let mut requests = self.requests.lock().await;
        match requests.get_mut(&request.id) {
            Some(stored) => {
                *stored = request;
                Ok(())
            }
            None => Err(RepositoryError::FriendRequestNotFound(
                request.id.into_string(),
            )),
        }
    }

    async fn find_by_id(
        &self,
        request_id: &FriendRequestId,
    ) -> Result<Option<FriendRequest>, RepositoryError> {
        let requests = self.requests.lock().await;
        Ok(requests.get(request_id).cloned())
    }

    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<FriendRequest>, RepositoryError> {
        let requests = self.requests.lock().await;
        Ok(requests
            .values()
            .find(|r| {
                (&r.requester == a && &r.recipient == b)
                    || (&r.requester == b && &r.recipient == a)
            })
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FriendRequest>, RepositoryError> {
        let requests = self.requests.lock().await;
        Ok(requests
            .values()
            .filter(|r| r.involves(user_id))
            .cloned()
            .collect())
    }

    async fn mark_requests_read(
        &self,
        recipient: &UserId,
        ids: Option<Vec<FriendRequestId>>,
        at: Timestamp,
    ) -> Result<Vec<FriendRequest>, RepositoryError> {
        let mut requests = self.requests.lock().await;
        let updated = requests
            .values_mut()
            .filter(|r| {
                &r.recipient == recipient
                    && r.status == FriendshipStatus::Pending
                    && !r.request_read
                    && id_filter(&ids, r)
            })
            .map(|r| {
                r.request_read = true;
                r.updated_at = at;
                r.clone()
            })
            .collect();
        Ok(updated)
    }

    async fn mark_acceptances_read(
        &self,
        requester: &UserId,
        ids: Option<Vec<FriendRequestId>>,
        at: Timestamp,
    ) -> Result<Vec<FriendRequest>, RepositoryError> {
        let mut requests = self.requests.lock().await;
        let updated = requests
            .values_mut()
            .filter(|r| {
                &r.requester == requester
                    && r.status == FriendshipStatus::Accepted
                    && !r.acceptance_read
                    && id_filter(&ids, r)
            })
            .map(|r| {
                r.acceptance_read = true;
                r.updated_at = at;
                r.clone()
            })
            .collect();
        Ok(updated)
    }
}
