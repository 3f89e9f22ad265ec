//! Export job models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use guichet_core::hashing::sha256_hex;
use guichet_core::types::{DbId, Timestamp};
use guichet_core::FilteredColumn;

use crate::models::status::StatusId;

/// Tabular/archive formats an export can be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Ods,
    Zip,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Ods => "ods",
            ExportFormat::Zip => "zip",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "csv" => Some(ExportFormat::Csv),
            "xlsx" => Some(ExportFormat::Xlsx),
            "ods" => Some(ExportFormat::Ods),
            "zip" => Some(ExportFormat::Zip),
            _ => None,
        }
    }
}

/// Which named dossier listing the export covers. Mirrors the filter
/// sets a presentation persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatut {
    Tous,
    Suivis,
    Traites,
}

impl ExportStatut {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportStatut::Tous => "tous",
            ExportStatut::Suivis => "suivis",
            ExportStatut::Traites => "traites",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "tous" => Some(ExportStatut::Tous),
            "suivis" => Some(ExportStatut::Suivis),
            "traites" => Some(ExportStatut::Traites),
            _ => None,
        }
    }
}

/// Time window selector for the covered dossiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSpanType {
    Everything,
    Monthly,
}

impl TimeSpanType {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeSpanType::Everything => "everything",
            TimeSpanType::Monthly => "monthly",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "everything" => Some(TimeSpanType::Everything),
            "monthly" => Some(TimeSpanType::Monthly),
            _ => None,
        }
    }
}

/// The requester of an export, over the finite set of profile kinds.
///
/// Stored as the `(user_profile_type, user_profile_id)` column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum UserProfile {
    Instructeur(DbId),
    Administrateur(DbId),
}

impl UserProfile {
    pub fn kind(self) -> &'static str {
        match self {
            UserProfile::Instructeur(_) => "Instructeur",
            UserProfile::Administrateur(_) => "Administrateur",
        }
    }

    pub fn id(self) -> DbId {
        match self {
            UserProfile::Instructeur(id) | UserProfile::Administrateur(id) => id,
        }
    }

    pub fn from_parts(kind: &str, id: DbId) -> Option<Self> {
        match kind {
            "Instructeur" => Some(UserProfile::Instructeur(id)),
            "Administrateur" => Some(UserProfile::Administrateur(id)),
            _ => None,
        }
    }
}

/// A row from the `exports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Export {
    pub id: DbId,
    pub user_profile_type: String,
    pub user_profile_id: DbId,
    pub format: String,
    pub statut: String,
    pub time_span_type: String,
    /// Request fingerprint used for deduplication.
    pub key: String,
    pub job_status: StatusId,
    /// Set exactly once, at the end of a successful compute.
    pub dossiers_count: Option<i64>,
    /// Artifact reference, set on successful generation.
    pub file_path: Option<String>,
    pub error_message: Option<String>,
    pub export_template_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Export {
    pub fn user_profile(&self) -> Option<UserProfile> {
        UserProfile::from_parts(&self.user_profile_type, self.user_profile_id)
    }

    pub fn format(&self) -> Option<ExportFormat> {
        ExportFormat::from_str(&self.format)
    }

    pub fn statut(&self) -> Option<ExportStatut> {
        ExportStatut::from_str(&self.statut)
    }

    pub fn time_span_type(&self) -> Option<TimeSpanType> {
        TimeSpanType::from_str(&self.time_span_type)
    }
}

/// DTO for inserting a new export record.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExport {
    pub user_profile: UserProfile,
    pub format: ExportFormat,
    pub statut: ExportStatut,
    pub time_span_type: TimeSpanType,
    pub key: String,
    /// Scope groups. Every export covers at least one.
    #[validate(length(min = 1, message = "an export needs at least one groupe instructeur"))]
    pub groupe_instructeur_ids: Vec<DbId>,
    pub export_template_id: Option<DbId>,
}

/// One export request, as seen by the registry. The fingerprint derived
/// from it identifies "the same request" for deduplication.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub format: ExportFormat,
    pub groupe_instructeur_ids: Vec<DbId>,
    pub user_profile: UserProfile,
    pub statut: ExportStatut,
    pub time_span_type: TimeSpanType,
    pub export_template_id: Option<DbId>,
    /// The presentation's current filter set for the requested statut.
    /// Ignored when an export template is given (the template fixes the
    /// layout and filters).
    pub presentation_filters: Option<&'a [FilteredColumn]>,
}

impl ExportRequest<'_> {
    /// Deduplication fingerprint over the request parameters.
    ///
    /// Scope groups are sorted first so group order never splits the
    /// cache. Filters enter the digest by (h_id, value) pair, so any
    /// presentation filter change yields a new fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut ids = self.groupe_instructeur_ids.clone();
        ids.sort_unstable();
        let ids = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let filters = match (self.export_template_id, self.presentation_filters) {
            (Some(template_id), _) => format!("template:{template_id}"),
            (None, Some(filters)) => filters
                .iter()
                .map(|f| format!("{}={}", f.h_id, f.filter))
                .collect::<Vec<_>>()
                .join("&"),
            (None, None) => String::new(),
        };

        let key = format!(
            "{}|{}|{}|{}|{}",
            self.format.as_str(),
            ids,
            self.statut.as_str(),
            self.time_span_type.as_str(),
            filters
        );
        sha256_hex(key.as_bytes())
    }

    pub(crate) fn to_create(&self) -> CreateExport {
        CreateExport {
            user_profile: self.user_profile,
            format: self.format,
            statut: self.statut,
            time_span_type: self.time_span_type,
            key: self.fingerprint(),
            groupe_instructeur_ids: self.groupe_instructeur_ids.clone(),
            export_template_id: self.export_template_id,
        }
    }
}
