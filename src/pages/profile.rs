// src/pages/profile.rs

use crate::api::Method;
use crate::controller::{FormController, SubmitOutcome};
use crate::error::AppError;
use crate::models::profile::ProfileDraft;
use crate::routes;
use crate::state::AppState;

/// Account settings of the signed-in evaluator.
pub struct ProfilePage {
    state: AppState,
    pub form: FormController<ProfileDraft>,
}

impl ProfilePage {
    pub fn new(state: AppState) -> Self {
        let form = FormController::new(state.notifier.clone());
        Self { state, form }
    }

    pub fn open(&mut self, name: &str, email: &str) {
        self.form.open(ProfileDraft {
            name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        });
    }

    pub async fn save(&mut self) -> Result<SubmitOutcome, AppError> {
        let outcome = self
            .form
            .submit(self.state.backend.as_ref(), Method::Put, routes::PROFILE)
            .await?;
        if let SubmitOutcome::Saved(_) = outcome {
            self.state.notifier.success("Profile updated.");
        }
        Ok(outcome)
    }
}
