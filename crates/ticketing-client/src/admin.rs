//! Admin dashboard API
//!
//! Every call takes the [`Session`] it runs under.

use crate::client::{ApiClient, check_status, decode};
use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use ticketing_core::models::{
    AdminAccount, AdminUpdate, AuditLogEntry, AuditLogQuery, AuditStats, DashboardStats, EventSettings,
    MarkUsedResponse, NewAdmin, RegistrationDetail, RegistrationList, SettingsUpdate,
    StatusFilter, TicketVerification,
};
use tracing::{debug, info};

impl ApiClient {
    /// List registrations, optionally filtered by review status
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is no longer valid.
    pub async fn registrations(
        &self,
        session: &Session,
        filter: Option<StatusFilter>,
    ) -> ClientResult<RegistrationList> {
        let mut url = self.endpoint("/api/admin/registrations");
        if let Some(filter) = filter {
            url.push_str("?status_filter=");
            url.push_str(filter.as_str());
        }

        debug!(%url, "Fetching registrations");
        decode(session.send(self.http().get(&url)).await?).await
    }

    /// Fetch one registration
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::NotFound`] for an unknown id.
    pub async fn registration(&self, session: &Session, id: i64) -> ClientResult<RegistrationDetail> {
        let url = self.endpoint(&format!("/api/admin/registrations/{id}"));
        decode(session.send(self.http().get(&url)).await?).await
    }

    /// Dashboard counters
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is no longer valid.
    pub async fn stats(&self, session: &Session) -> ClientResult<DashboardStats> {
        let url = self.endpoint("/api/admin/stats");
        decode(session.send(self.http().get(&url)).await?).await
    }

    /// Page through the audit log
    ///
    /// The page size is clamped to what the backend accepts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is no longer valid.
    pub async fn audit_logs(
        &self,
        session: &Session,
        query: &AuditLogQuery,
    ) -> ClientResult<Vec<AuditLogEntry>> {
        let url = format!(
            "{}?{}",
            self.endpoint("/api/admin/audit/logs"),
            audit_query_string(query)
        );

        debug!(%url, "Fetching audit logs");
        decode(session.send(self.http().get(&url)).await?).await
    }

    /// Audit log counters
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is no longer valid.
    pub async fn audit_stats(&self, session: &Session) -> ClientResult<AuditStats> {
        let url = self.endpoint("/api/admin/audit/stats");
        decode(session.send(self.http().get(&url)).await?).await
    }

    /// Check a ticket at the entrance
    ///
    /// Serial codes are matched upper-case.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is no longer valid.
    pub async fn verify_ticket(
        &self,
        session: &Session,
        serial: &str,
    ) -> ClientResult<TicketVerification> {
        let url = self.endpoint(&format!("/api/verify-ticket/{}", serial_segment(serial)));
        decode(session.send(self.http().get(&url)).await?).await
    }

    /// Mark a ticket as used for entry
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket is unknown, not approved, or already used.
    pub async fn mark_ticket_used(
        &self,
        session: &Session,
        serial: &str,
    ) -> ClientResult<MarkUsedResponse> {
        let url = self.endpoint(&format!("/api/mark-used/{}", serial_segment(serial)));
        let response: MarkUsedResponse = decode(session.send(self.http().post(&url)).await?).await?;
        info!(serial = %serial.trim().to_uppercase(), success = response.success, "Ticket marked as used");
        Ok(response)
    }

    /// Current event settings
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is no longer valid.
    pub async fn settings(&self, session: &Session) -> ClientResult<EventSettings> {
        let url = self.endpoint("/admin/settings");
        decode(session.send(self.http().get(&url)).await?).await
    }

    /// Change event settings; unset fields keep their value
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is no longer valid.
    pub async fn update_settings(
        &self,
        session: &Session,
        update: &SettingsUpdate,
    ) -> ClientResult<EventSettings> {
        let url = self.endpoint("/admin/settings");
        let settings: EventSettings =
            decode(session.send(self.http().put(&url).json(update)).await?).await?;
        info!(event = %settings.event_name, "Event settings updated");
        Ok(settings)
    }

    /// List admin accounts
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is no longer valid.
    pub async fn admins(&self, session: &Session) -> ClientResult<Vec<AdminAccount>> {
        let url = self.endpoint("/api/admin/admins");
        decode(session.send(self.http().get(&url)).await?).await
    }

    /// Create an admin account
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email is taken, or the session
    /// lacks the superadmin role.
    pub async fn create_admin(&self, session: &Session, admin: &NewAdmin) -> ClientResult<AdminAccount> {
        let url = self.endpoint("/api/admin/admins");
        let created: AdminAccount =
            decode(session.send(self.http().post(&url).json(admin)).await?).await?;
        info!(id = created.id, role = %created.role, "Admin account created");
        Ok(created)
    }

    /// Fetch one admin account
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::NotFound`] for an unknown id.
    pub async fn admin(&self, session: &Session, id: i64) -> ClientResult<AdminAccount> {
        let url = self.endpoint(&format!("/api/admin/admins/{id}"));
        decode(session.send(self.http().get(&url)).await?).await
    }

    /// Change an admin account's details, role, password or active flag
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty update, or the backend's
    /// reason when the email is taken or the account does not exist.
    pub async fn update_admin(
        &self,
        session: &Session,
        id: i64,
        update: &AdminUpdate,
    ) -> ClientResult<AdminAccount> {
        if update.is_empty() {
            return Err(ClientError::validation("Nothing to update"));
        }

        let url = self.endpoint(&format!("/api/admin/admins/{id}"));
        let updated: AdminAccount =
            decode(session.send(self.http().put(&url).json(update)).await?).await?;
        info!(id, role = %updated.role, active = updated.is_active, "Admin account updated");
        Ok(updated)
    }

    /// Delete an admin account
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or cannot be deleted.
    pub async fn delete_admin(&self, session: &Session, id: i64) -> ClientResult<()> {
        let url = self.endpoint(&format!("/api/admin/admins/{id}"));
        check_status(session.send(self.http().delete(&url)).await?).await?;
        info!(id, "Admin account deleted");
        Ok(())
    }
}

fn serial_segment(serial: &str) -> String {
    urlencoding::encode(&serial.trim().to_uppercase()).into_owned()
}

fn audit_query_string(query: &AuditLogQuery) -> String {
    let query = query.clamped();
    let mut params = vec![
        format!("limit={}", query.limit),
        format!("offset={}", query.offset),
    ];

    if let Some(action) = &query.action {
        params.push(format!("action={}", urlencoding::encode(action)));
    }
    if let Some(admin_id) = query.admin_id {
        params.push(format!("admin_id={admin_id}"));
    }

    params.join("&")
}
