use async_trait::async_trait;
use certadm_common::certificate::{CertificateStatus, RevocationReason};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{doc, to_bson},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use tracing::{debug, info, instrument};

use crate::{
    models::{DbCertificate, DbConfigEntry},
    storage::{CertificateStore, ConfigStore, Storage, StoreError},
};

pub const MONGODB_COLLECTION_CERTIFICATES: &str = "certificates";
pub const MONGODB_COLLECTION_CONFIG: &str = "config";

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug)]
pub struct MongoDBStorage(Client);

impl MongoDBStorage {
    pub async fn new(uri: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self(client))
    }

    fn get_db(&self) -> Database {
        self.0
            .default_database()
            .unwrap_or_else(|| self.0.database("certadm"))
    }

    fn certificates(&self) -> Collection<DbCertificate> {
        self.get_db()
            .collection::<DbCertificate>(MONGODB_COLLECTION_CERTIFICATES)
    }

    fn config(&self) -> Collection<DbConfigEntry> {
        self.get_db()
            .collection::<DbConfigEntry>(MONGODB_COLLECTION_CONFIG)
    }

    /// Create the unique index that makes the serial number a key.
    ///
    /// Fails if the collection already holds duplicate serials.
    #[instrument(skip(self))]
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "serial_number": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.certificates().create_index(index).await?;
        info!("Unique serial number index in place");
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl Storage for MongoDBStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        self.get_db().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[async_trait]
impl CertificateStore for MongoDBStorage {
    #[instrument(skip(self))]
    async fn lookup(&self, serial: i64) -> Result<Option<DbCertificate>, StoreError> {
        // Two is enough to tell "unique" from "not unique".
        let mut found: Vec<DbCertificate> = self
            .certificates()
            .find(doc! { "serial_number": serial })
            .limit(2)
            .await?
            .try_collect()
            .await?;

        if found.len() > 1 {
            let count = self
                .certificates()
                .count_documents(doc! { "serial_number": serial })
                .await? as usize;
            return Err(StoreError::DuplicateSerial { serial, count });
        }

        Ok(found.pop())
    }

    #[instrument(skip(self))]
    async fn revoke(
        &self,
        serial: i64,
        revocation_date: &str,
        reason: RevocationReason,
    ) -> Result<DbCertificate, StoreError> {
        let reason = to_bson(&reason).map_err(|e| StoreError::Internal(Box::new(e)))?;

        let updated = self
            .certificates()
            .find_one_and_update(
                doc! {
                    "serial_number": serial,
                    "status": CertificateStatus::Valid.flag(),
                },
                doc! {
                    "$set": {
                        "status": CertificateStatus::Revoked.flag(),
                        "revocation_date": revocation_date,
                        "revocation_reason": reason,
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        if let Some(record) = updated {
            debug!(serial, "Certificate revoked");
            return Ok(record);
        }

        // Nothing matched the conditional write: report why.
        match self.lookup(serial).await? {
            Some(record) => Err(StoreError::NotRevocable {
                serial,
                status: record.status,
            }),
            None => Err(StoreError::CertificateNotFound { serial }),
        }
    }

    #[instrument(skip(self, certificate), fields(serial = certificate.serial_number))]
    async fn insert(&self, mut certificate: DbCertificate) -> Result<DbCertificate, StoreError> {
        let serial = certificate.serial_number;
        if self.lookup(serial).await?.is_some() {
            return Err(StoreError::DuplicateSerial { serial, count: 2 });
        }

        let result = self
            .certificates()
            .insert_one(&certificate)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    StoreError::DuplicateSerial { serial, count: 2 }
                } else {
                    StoreError::MongoDB(e)
                }
            })?;

        certificate.id = result.inserted_id.as_object_id();
        Ok(certificate)
    }
}

#[async_trait]
impl ConfigStore for MongoDBStorage {
    async fn get_config(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entry = self.config().find_one(doc! { "_id": key }).await?;
        Ok(entry.map(|e| e.value))
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.config()
            .update_one(doc! { "_id": key }, doc! { "$set": { "value": value } })
            .upsert(true)
            .await?;
        Ok(())
    }
}
