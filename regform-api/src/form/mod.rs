//! Form state controller.
//!
//! Owns the in-progress [`ContactRecord`] and the [`FormState`]; the command
//! methods are the only mutators. The lock is held for synchronous sections
//! only, never across the lookup or export await, so edits keep flowing while
//! a remote call is in flight.

pub mod outcome;

use input_masks::{format_postal_code, mask_phone, mask_postal_code};
use shared_types::{ContactRecord, FormField, FormSnapshot, FormState, Notice};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::export::photo::{estimated_size, is_image_data_uri, MAX_PHOTO_BYTES};
use crate::export::ContactExporter;
use crate::integrations::{lookup_address, AddressDirectory};

pub use outcome::{validate_for_submit, LookupOutcome, SubmitOutcome, ValidationError};

#[derive(Debug, Default)]
struct FormInner {
    record: ContactRecord,
    state: FormState,
}

pub struct FormController {
    inner: Mutex<FormInner>,
    directory: Arc<dyn AddressDirectory>,
    exporter: Arc<dyn ContactExporter>,
}

/// Puts the controller back into `Editing` when dropped, whatever the way out
/// of the in-flight action.
struct EditingOnDrop<'a> {
    controller: &'a FormController,
}

impl Drop for EditingOnDrop<'_> {
    fn drop(&mut self) {
        self.controller.lock().state = FormState::Editing;
    }
}

impl FormController {
    pub fn new(directory: Arc<dyn AddressDirectory>, exporter: Arc<dyn ContactExporter>) -> Self {
        Self {
            inner: Mutex::new(FormInner::default()),
            directory,
            exporter,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let inner = self.lock();
        FormSnapshot {
            record: inner.record.clone(),
            state: inner.state,
            busy: inner.state != FormState::Editing,
        }
    }

    pub fn record(&self) -> ContactRecord {
        self.lock().record.clone()
    }

    pub fn state(&self) -> FormState {
        self.lock().state
    }

    /// Stores a keystroke-level edit, masking phone and postal code.
    ///
    /// Returns `false` when the edit was ignored: the address field is
    /// disabled while a lookup is in flight.
    pub fn apply_edit(&self, field: FormField, raw: &str) -> bool {
        let mut inner = self.lock();

        if field == FormField::Address && inner.state == FormState::LookingUp {
            tracing::debug!("Ignoring address edit during postal code lookup");
            return false;
        }

        let record = &mut inner.record;
        match field {
            FormField::Name => record.name = raw.to_string(),
            FormField::Email => record.email = raw.to_string(),
            FormField::Phone => record.phone = mask_phone(raw),
            FormField::PostalCode => record.postal_code = mask_postal_code(raw),
            FormField::Address => record.address = raw.to_string(),
        }

        true
    }

    /// Sets the photo from a data URI; an empty value removes it.
    pub fn set_photo(&self, data_uri: &str) -> Notice {
        if data_uri.is_empty() {
            return self.remove_photo();
        }

        if !is_image_data_uri(data_uri) {
            return Notice::warning("Please select image files only.");
        }

        if estimated_size(data_uri) > MAX_PHOTO_BYTES {
            return Notice::warning("File too large. Maximum 5MB.");
        }

        self.lock().record.photo = data_uri.to_string();
        Notice::success("Photo selected successfully!")
    }

    pub fn remove_photo(&self) -> Notice {
        self.lock().record.photo.clear();
        Notice::info("Photo removed")
    }

    /// Fills postal code and address from the lookup service.
    pub async fn lookup_postal_code(&self) -> LookupOutcome {
        let postal_code = {
            let mut inner = self.lock();

            if inner.state != FormState::Editing {
                return LookupOutcome::Busy;
            }
            if inner.record.postal_code.is_empty() {
                return LookupOutcome::MissingPostalCode;
            }

            inner.state = FormState::LookingUp;
            inner.record.postal_code.clone()
        };
        let _editing = EditingOnDrop { controller: self };

        tracing::info!("Looking up postal code {}", postal_code);

        let found = lookup_address(self.directory.as_ref(), &postal_code).await;
        match found {
            Ok(Some(address)) => {
                let mut inner = self.lock();
                inner.record.postal_code = format_postal_code(&postal_code);
                inner.record.address = address.to_address_line();
                LookupOutcome::Found(address)
            }
            Ok(None) => LookupOutcome::NotFound,
            Err(e) => {
                tracing::warn!("Postal code lookup failed: {}", e);
                LookupOutcome::Failed(e)
            }
        }
    }

    /// Validates the record and exports it, resetting the form on success.
    pub async fn submit(&self) -> SubmitOutcome {
        let record = {
            let mut inner = self.lock();

            if inner.state != FormState::Editing {
                return SubmitOutcome::Busy;
            }
            if let Err(e) = validate_for_submit(&inner.record) {
                tracing::debug!("Submit rejected: {}", e);
                return SubmitOutcome::Rejected(e);
            }

            inner.state = FormState::Exporting;
            inner.record.clone()
        };
        let _editing = EditingOnDrop { controller: self };

        match self.exporter.export(&record).await {
            Ok(receipt) => {
                self.lock().record = ContactRecord::default();
                tracing::info!("Form submitted, document {}", receipt.file_name);
                SubmitOutcome::Exported(receipt)
            }
            Err(e) => {
                tracing::error!("Export failed, keeping form data: {}", e);
                SubmitOutcome::ExportFailed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::photo::encode_data_uri;
    use crate::export::ExportError;
    use crate::integrations::{LookupError, ViaCepAddress};
    use async_trait::async_trait;
    use shared_types::ExportReceipt;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    enum Reply {
        Found,
        NotFound,
        Fail,
    }

    struct FakeDirectory {
        reply: Reply,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl FakeDirectory {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                gate: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn gated(reply: Reply, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                gate: Some(gate),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AddressDirectory for FakeDirectory {
        async fn find(&self, _postal_code_digits: &str) -> Result<Option<ViaCepAddress>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            match self.reply {
                Reply::Found => Ok(Some(ViaCepAddress {
                    logradouro: "Avenida Paulista".to_string(),
                    complemento: "de 612 a 1510 - lado par".to_string(),
                    bairro: "Bela Vista".to_string(),
                    localidade: "São Paulo".to_string(),
                    uf: "SP".to_string(),
                    estado: "São Paulo".to_string(),
                    ..Default::default()
                })),
                Reply::NotFound => Ok(None),
                Reply::Fail => Err(LookupError::Transport("connection reset".to_string())),
            }
        }
    }

    #[derive(Default)]
    struct FakeExporter {
        fail: AtomicBool,
        exported: Mutex<Vec<ContactRecord>>,
    }

    #[async_trait]
    impl ContactExporter for FakeExporter {
        async fn export(&self, record: &ContactRecord) -> Result<ExportReceipt, ExportError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ExportError::Render("renderer exploded".to_string()));
            }

            self.exported.lock().unwrap().push(record.clone());
            Ok(ExportReceipt {
                file_name: "formulario_ana_1.pdf".to_string(),
                path: Some("/tmp/formulario_ana_1.pdf".to_string()),
                download_url: None,
            })
        }
    }

    fn controller(directory: Arc<FakeDirectory>) -> (FormController, Arc<FakeExporter>) {
        let exporter = Arc::new(FakeExporter::default());
        (FormController::new(directory, exporter.clone()), exporter)
    }

    fn fill_valid(form: &FormController) {
        form.apply_edit(FormField::Name, "Ana");
        form.apply_edit(FormField::Email, "a@a.com");
        form.apply_edit(FormField::Phone, "11999998888");
    }

    #[test]
    fn test_edits_are_masked() {
        let (form, _) = controller(FakeDirectory::new(Reply::Found));

        form.apply_edit(FormField::Phone, "11999998888");
        form.apply_edit(FormField::PostalCode, "01310100");
        form.apply_edit(FormField::Name, "  Ana  ");

        let record = form.record();
        assert_eq!(record.phone, "(11) 99999-8888");
        assert_eq!(record.postal_code, "01310-100");
        assert_eq!(record.name, "  Ana  ");
        assert_eq!(form.state(), FormState::Editing);
    }

    #[tokio::test]
    async fn test_submit_with_empty_name_does_not_export() {
        let (form, exporter) = controller(FakeDirectory::new(Reply::Found));
        form.apply_edit(FormField::Email, "a@a.com");
        form.apply_edit(FormField::Phone, "11999998888");

        let outcome = form.submit().await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Rejected(ValidationError::MissingRequiredFields)
        ));
        assert!(exporter.exported.lock().unwrap().is_empty());
        assert_eq!(form.record().email, "a@a.com");
    }

    #[tokio::test]
    async fn test_submit_exports_once_and_resets() {
        let (form, exporter) = controller(FakeDirectory::new(Reply::Found));
        fill_valid(&form);

        let outcome = form.submit().await;

        assert_eq!(outcome.receipt().unwrap().file_name, "formulario_ana_1.pdf");
        let exported = exporter.exported.lock().unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].phone, "(11) 99999-8888");
        assert_eq!(exported[0].name, "Ana");
        assert!(form.record().is_empty());
        assert_eq!(form.state(), FormState::Editing);
    }

    #[tokio::test]
    async fn test_invalid_postal_code_rejected() {
        let (form, exporter) = controller(FakeDirectory::new(Reply::Found));
        fill_valid(&form);
        form.apply_edit(FormField::PostalCode, "0131");

        let outcome = form.submit().await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Rejected(ValidationError::InvalidPostalCode)
        ));
        assert!(exporter.exported.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_failure_keeps_record() {
        let (form, exporter) = controller(FakeDirectory::new(Reply::Found));
        exporter.fail.store(true, Ordering::SeqCst);
        fill_valid(&form);
        let before = form.record();

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::ExportFailed(_)));
        assert_eq!(form.record(), before);
        assert_eq!(form.state(), FormState::Editing);

        // Resubmitting once the exporter recovers works
        exporter.fail.store(false, Ordering::SeqCst);
        assert!(matches!(form.submit().await, SubmitOutcome::Exported(_)));
    }

    #[tokio::test]
    async fn test_lookup_found_overwrites_address() {
        let (form, _) = controller(FakeDirectory::new(Reply::Found));
        form.apply_edit(FormField::PostalCode, "01310100");
        form.apply_edit(FormField::Address, "old address");

        let outcome = form.lookup_postal_code().await;

        assert!(matches!(outcome, LookupOutcome::Found(_)));
        assert_eq!(outcome.notice().message, "Address found: São Paulo/SP");
        let record = form.record();
        assert_eq!(record.postal_code, "01310-100");
        assert_eq!(
            record.address,
            "Avenida Paulista, de 612 a 1510 - lado par, Bela Vista, São Paulo, SP"
        );
        assert_eq!(form.state(), FormState::Editing);
    }

    #[tokio::test]
    async fn test_lookup_not_found_leaves_record() {
        let (form, _) = controller(FakeDirectory::new(Reply::NotFound));
        form.apply_edit(FormField::PostalCode, "00000000");
        form.apply_edit(FormField::Address, "Rua A, 1");

        let outcome = form.lookup_postal_code().await;

        assert!(matches!(outcome, LookupOutcome::NotFound));
        let record = form.record();
        assert_eq!(record.postal_code, "00000-000");
        assert_eq!(record.address, "Rua A, 1");
        assert_eq!(form.state(), FormState::Editing);
    }

    #[tokio::test]
    async fn test_lookup_failure_returns_to_editing() {
        let (form, _) = controller(FakeDirectory::new(Reply::Fail));
        form.apply_edit(FormField::PostalCode, "01310100");

        let outcome = form.lookup_postal_code().await;

        assert!(matches!(outcome, LookupOutcome::Failed(_)));
        assert_eq!(form.record().address, "");
        assert_eq!(form.state(), FormState::Editing);
    }

    #[tokio::test]
    async fn test_lookup_without_postal_code() {
        let directory = FakeDirectory::new(Reply::Found);
        let (form, _) = controller(directory.clone());

        let outcome = form.lookup_postal_code().await;

        assert!(matches!(outcome, LookupOutcome::MissingPostalCode));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_busy_lookup_ignores_triggers_and_address_edits() {
        let gate = Arc::new(Notify::new());
        let directory = FakeDirectory::gated(Reply::Found, gate.clone());
        let exporter = Arc::new(FakeExporter::default());
        let form = Arc::new(FormController::new(directory.clone(), exporter.clone()));
        fill_valid(&form);
        form.apply_edit(FormField::PostalCode, "01310100");

        let in_flight = tokio::spawn({
            let form = form.clone();
            async move { form.lookup_postal_code().await }
        });
        while form.state() != FormState::LookingUp {
            tokio::task::yield_now().await;
        }

        assert!(form.snapshot().busy);
        assert!(matches!(form.lookup_postal_code().await, LookupOutcome::Busy));
        assert!(matches!(form.submit().await, SubmitOutcome::Busy));
        assert!(!form.apply_edit(FormField::Address, "typed while busy"));
        assert!(form.apply_edit(FormField::Name, "Ana Maria"));

        gate.notify_one();
        let outcome = in_flight.await.unwrap();

        assert!(matches!(outcome, LookupOutcome::Found(_)));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
        assert!(exporter.exported.lock().unwrap().is_empty());
        assert_eq!(form.record().name, "Ana Maria");
        assert_eq!(form.state(), FormState::Editing);
    }

    #[tokio::test]
    async fn test_dropped_lookup_restores_editing() {
        let gate = Arc::new(Notify::new());
        let (form, _) = controller(FakeDirectory::gated(Reply::Found, gate));
        form.apply_edit(FormField::PostalCode, "01310100");

        let lookup = form.lookup_postal_code();
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(10), lookup).await;

        assert!(timed_out.is_err());
        assert_eq!(form.state(), FormState::Editing);
    }

    #[test]
    fn test_photo_limits() {
        let (form, _) = controller(FakeDirectory::new(Reply::Found));

        let small = encode_data_uri("image/jpeg", &[1u8; 64]);
        assert_eq!(form.set_photo(&small).level, shared_types::NoticeLevel::Success);
        assert_eq!(form.record().photo, small);

        let huge = encode_data_uri("image/jpeg", &vec![0u8; MAX_PHOTO_BYTES + 3]);
        assert_eq!(form.set_photo(&huge).level, shared_types::NoticeLevel::Warning);
        assert_eq!(form.record().photo, small);

        form.remove_photo();
        assert!(!form.record().has_photo());
    }

    #[test]
    fn test_non_image_photo_rejected() {
        let (form, _) = controller(FakeDirectory::new(Reply::Found));
        let photo = encode_data_uri("image/png", &[7u8; 16]);
        form.set_photo(&photo);

        for rejected in ["data:text/plain;base64,aGVsbG8=", "not a data uri at all"] {
            let notice = form.set_photo(rejected);
            assert_eq!(notice.level, shared_types::NoticeLevel::Warning);
            assert_eq!(notice.message, "Please select image files only.");
            assert_eq!(form.record().photo, photo);
        }
    }
}
