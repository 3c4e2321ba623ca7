//! UseCase: ユーザー情報の取得（presence の初期状態の再取得用）

use std::sync::Arc;

use crate::domain::{User, UserId, UserRepository};

use super::error::QueryError;

pub struct GetUserUseCase {
    users: Arc<dyn UserRepository>,
}

impl GetUserUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(&self, user_id: &UserId) -> Result<User, QueryError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(QueryError::NotFound("user"))
    }
}
