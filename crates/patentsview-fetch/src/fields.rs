//! Field catalog for the PatentsView patent endpoint.
//!
//! Every field the endpoint can return is listed once, together with the
//! output [`Group`] it belongs to. Patent-level fields sit at the top of each
//! record; every other group arrives as an array of objects under its
//! [`Group::response_key`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

use crate::error::{FetchError, FetchResult};

/// Field every child table uses as its foreign key back to the patent.
pub const PATENT_NUMBER: &str = "patent_number";

/// Internal surrogate keys the API attaches to nested objects.
///
/// They carry no meaning outside one database release and are never written.
pub const SURROGATE_KEYS: &[&str] = &["inventor_key_id", "assignee_key_id", "app_id"];

/// One output table, i.e. one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    /// Patent-level fields, one row per patent
    Patents,
    /// Disambiguated inventors
    Inventors,
    /// Inventors as printed on the patent
    RawInventors,
    /// Disambiguated assignees
    Assignees,
    /// Application filing data
    Applications,
    /// International Patent Classification entries (`IPCs` in responses)
    Ipcs,
    /// Citations of published applications
    ApplicationCitations,
    /// Patents this patent cites
    CitedPatents,
    /// Patents that cite this patent
    CitedByPatents,
    /// US Patent Classification entries
    Uspcs,
    /// Cooperative Patent Classification entries
    Cpcs,
    /// NBER technology categories
    Nbers,
    /// WIPO technology fields
    Wipos,
    /// Government interest statements and funding
    GovInterests,
    /// Attorneys and agents
    Lawyers,
    /// Patent examiners
    Examiners,
    /// Foreign priority claims
    ForeignPriority,
    /// PCT filing data
    PctData,
}

impl Group {
    /// All groups in output order.
    pub const ALL: [Self; 18] = [
        Self::Patents,
        Self::Inventors,
        Self::RawInventors,
        Self::Assignees,
        Self::Applications,
        Self::Ipcs,
        Self::ApplicationCitations,
        Self::CitedPatents,
        Self::CitedByPatents,
        Self::Uspcs,
        Self::Cpcs,
        Self::Nbers,
        Self::Wipos,
        Self::GovInterests,
        Self::Lawyers,
        Self::Examiners,
        Self::ForeignPriority,
        Self::PctData,
    ];

    /// Table name used for output files and lookups.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Patents => "patents",
            Self::Inventors => "inventors",
            Self::RawInventors => "rawinventors",
            Self::Assignees => "assignees",
            Self::Applications => "applications",
            Self::Ipcs => "ipcs",
            Self::ApplicationCitations => "application_citations",
            Self::CitedPatents => "cited_patents",
            Self::CitedByPatents => "citedby_patents",
            Self::Uspcs => "uspcs",
            Self::Cpcs => "cpcs",
            Self::Nbers => "nbers",
            Self::Wipos => "wipos",
            Self::GovInterests => "gov_interests",
            Self::Lawyers => "lawyers",
            Self::Examiners => "examiners",
            Self::ForeignPriority => "foreign_priority",
            Self::PctData => "pct_data",
        }
    }

    /// Key of the nested array in a patent record, `None` for top-level fields.
    #[must_use]
    pub const fn response_key(self) -> Option<&'static str> {
        match self {
            Self::Patents => None,
            Self::Ipcs => Some("IPCs"),
            other => Some(other.name()),
        }
    }

    /// Look a group up by its table name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.name() == name)
    }

    /// Whether rows of this group hang off a parent patent.
    #[must_use]
    pub const fn is_child(self) -> bool {
        !matches!(self, Self::Patents)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every field of the patent endpoint and the group it is reported under.
const FIELDS: &[(&str, Group)] = &[
    // Patent
    ("detail_desc_length", Group::Patents),
    ("patent_abstract", Group::Patents),
    ("patent_average_processing_time", Group::Patents),
    ("patent_date", Group::Patents),
    ("patent_firstnamed_assignee_city", Group::Patents),
    ("patent_firstnamed_assignee_country", Group::Patents),
    ("patent_firstnamed_assignee_id", Group::Patents),
    ("patent_firstnamed_assignee_latitude", Group::Patents),
    ("patent_firstnamed_assignee_location_id", Group::Patents),
    ("patent_firstnamed_assignee_longitude", Group::Patents),
    ("patent_firstnamed_assignee_state", Group::Patents),
    ("patent_firstnamed_inventor_city", Group::Patents),
    ("patent_firstnamed_inventor_country", Group::Patents),
    ("patent_firstnamed_inventor_id", Group::Patents),
    ("patent_firstnamed_inventor_latitude", Group::Patents),
    ("patent_firstnamed_inventor_location_id", Group::Patents),
    ("patent_firstnamed_inventor_longitude", Group::Patents),
    ("patent_firstnamed_inventor_state", Group::Patents),
    ("patent_id", Group::Patents),
    ("patent_kind", Group::Patents),
    ("patent_num_cited_by_us_patents", Group::Patents),
    ("patent_num_claims", Group::Patents),
    ("patent_num_combined_citations", Group::Patents),
    ("patent_num_foreign_citations", Group::Patents),
    ("patent_num_us_application_citations", Group::Patents),
    ("patent_num_us_patent_citations", Group::Patents),
    ("patent_number", Group::Patents),
    ("patent_processing_time", Group::Patents),
    ("patent_title", Group::Patents),
    ("patent_type", Group::Patents),
    ("patent_year", Group::Patents),
    // Inventor
    ("inventor_city", Group::Inventors),
    ("inventor_country", Group::Inventors),
    ("inventor_county", Group::Inventors),
    ("inventor_county_fips", Group::Inventors),
    ("inventor_first_name", Group::Inventors),
    ("inventor_first_seen_date", Group::Inventors),
    ("inventor_id", Group::Inventors),
    ("inventor_key_id", Group::Inventors),
    ("inventor_last_name", Group::Inventors),
    ("inventor_last_seen_date", Group::Inventors),
    ("inventor_lastknown_city", Group::Inventors),
    ("inventor_lastknown_country", Group::Inventors),
    ("inventor_lastknown_latitude", Group::Inventors),
    ("inventor_lastknown_location_id", Group::Inventors),
    ("inventor_lastknown_longitude", Group::Inventors),
    ("inventor_lastknown_state", Group::Inventors),
    ("inventor_latitude", Group::Inventors),
    ("inventor_location_id", Group::Inventors),
    ("inventor_longitude", Group::Inventors),
    ("inventor_sequence", Group::Inventors),
    ("inventor_state", Group::Inventors),
    ("inventor_state_fips", Group::Inventors),
    ("inventor_total_num_patents", Group::Inventors),
    // Raw inventor
    ("rawinventor_first_name", Group::RawInventors),
    ("rawinventor_last_name", Group::RawInventors),
    // Assignee
    ("assignee_city", Group::Assignees),
    ("assignee_country", Group::Assignees),
    ("assignee_county", Group::Assignees),
    ("assignee_county_fips", Group::Assignees),
    ("assignee_first_name", Group::Assignees),
    ("assignee_first_seen_date", Group::Assignees),
    ("assignee_id", Group::Assignees),
    ("assignee_key_id", Group::Assignees),
    ("assignee_last_name", Group::Assignees),
    ("assignee_last_seen_date", Group::Assignees),
    ("assignee_lastknown_city", Group::Assignees),
    ("assignee_lastknown_country", Group::Assignees),
    ("assignee_lastknown_latitude", Group::Assignees),
    ("assignee_lastknown_location_id", Group::Assignees),
    ("assignee_lastknown_longitude", Group::Assignees),
    ("assignee_lastknown_state", Group::Assignees),
    ("assignee_latitude", Group::Assignees),
    ("assignee_location_id", Group::Assignees),
    ("assignee_longitude", Group::Assignees),
    ("assignee_organization", Group::Assignees),
    ("assignee_sequence", Group::Assignees),
    ("assignee_state", Group::Assignees),
    ("assignee_state_fips", Group::Assignees),
    ("assignee_total_num_inventors", Group::Assignees),
    ("assignee_total_num_patents", Group::Assignees),
    ("assignee_type", Group::Assignees),
    // Application
    ("app_country", Group::Applications),
    ("app_date", Group::Applications),
    ("app_id", Group::Applications),
    ("app_number", Group::Applications),
    ("app_type", Group::Applications),
    // IPC
    ("ipc_action_date", Group::Ipcs),
    ("ipc_class", Group::Ipcs),
    ("ipc_classification_data_source", Group::Ipcs),
    ("ipc_classification_value", Group::Ipcs),
    ("ipc_main_group", Group::Ipcs),
    ("ipc_section", Group::Ipcs),
    ("ipc_sequence", Group::Ipcs),
    ("ipc_subclass", Group::Ipcs),
    ("ipc_subgroup", Group::Ipcs),
    ("ipc_symbol_position", Group::Ipcs),
    ("ipc_version_indicator", Group::Ipcs),
    // Application citation
    ("appcit_app_number", Group::ApplicationCitations),
    ("appcit_category", Group::ApplicationCitations),
    ("appcit_date", Group::ApplicationCitations),
    ("appcit_kind", Group::ApplicationCitations),
    ("appcit_sequence", Group::ApplicationCitations),
    // Cited patent
    ("cited_patent_category", Group::CitedPatents),
    ("cited_patent_date", Group::CitedPatents),
    ("cited_patent_kind", Group::CitedPatents),
    ("cited_patent_number", Group::CitedPatents),
    ("cited_patent_sequence", Group::CitedPatents),
    ("cited_patent_title", Group::CitedPatents),
    // Cited-by patent
    ("citedby_patent_category", Group::CitedByPatents),
    ("citedby_patent_date", Group::CitedByPatents),
    ("citedby_patent_kind", Group::CitedByPatents),
    ("citedby_patent_number", Group::CitedByPatents),
    ("citedby_patent_title", Group::CitedByPatents),
    // USPC
    ("uspc_mainclass_id", Group::Uspcs),
    ("uspc_mainclass_title", Group::Uspcs),
    ("uspc_sequence", Group::Uspcs),
    ("uspc_subclass_id", Group::Uspcs),
    ("uspc_subclass_title", Group::Uspcs),
    // CPC
    ("cpc_category", Group::Cpcs),
    ("cpc_group_id", Group::Cpcs),
    ("cpc_group_title", Group::Cpcs),
    ("cpc_section_id", Group::Cpcs),
    ("cpc_sequence", Group::Cpcs),
    ("cpc_subgroup_id", Group::Cpcs),
    ("cpc_subgroup_title", Group::Cpcs),
    ("cpc_subsection_id", Group::Cpcs),
    ("cpc_subsection_title", Group::Cpcs),
    // NBER
    ("nber_category_id", Group::Nbers),
    ("nber_category_title", Group::Nbers),
    ("nber_subcategory_id", Group::Nbers),
    ("nber_subcategory_title", Group::Nbers),
    // WIPO
    ("wipo_field_id", Group::Wipos),
    ("wipo_field_title", Group::Wipos),
    ("wipo_sector_title", Group::Wipos),
    ("wipo_sequence", Group::Wipos),
    // Government interest
    ("govint_contract_award_number", Group::GovInterests),
    ("govint_org_id", Group::GovInterests),
    ("govint_org_level_one", Group::GovInterests),
    ("govint_org_level_three", Group::GovInterests),
    ("govint_org_level_two", Group::GovInterests),
    ("govint_org_name", Group::GovInterests),
    ("govint_raw_statement", Group::GovInterests),
    // Lawyer
    ("lawyer_first_name", Group::Lawyers),
    ("lawyer_id", Group::Lawyers),
    ("lawyer_last_name", Group::Lawyers),
    ("lawyer_organization", Group::Lawyers),
    ("lawyer_sequence", Group::Lawyers),
    // Examiner
    ("examiner_first_name", Group::Examiners),
    ("examiner_group", Group::Examiners),
    ("examiner_id", Group::Examiners),
    ("examiner_last_name", Group::Examiners),
    ("examiner_role", Group::Examiners),
    // Foreign priority
    ("forprior_country", Group::ForeignPriority),
    ("forprior_date", Group::ForeignPriority),
    ("forprior_docnumber", Group::ForeignPriority),
    ("forprior_kind", Group::ForeignPriority),
    ("forprior_sequence", Group::ForeignPriority),
    // PCT
    ("pct_102_date", Group::PctData),
    ("pct_371_date", Group::PctData),
    ("pct_date", Group::PctData),
    ("pct_docnumber", Group::PctData),
    ("pct_doctype", Group::PctData),
    ("pct_kind", Group::PctData),
];

static CATALOG: LazyLock<HashMap<&'static str, Group>> = LazyLock::new(|| {
    let catalog: HashMap<_, _> = FIELDS.iter().copied().collect();
    debug_assert_eq!(catalog.len(), FIELDS.len(), "duplicate field in catalog");
    catalog
});

/// Group a field is reported under, `None` for unknown fields.
#[must_use]
pub fn group_of(field: &str) -> Option<Group> {
    CATALOG.get(field).copied()
}

/// Every known field with its group, in catalog order.
#[must_use]
pub fn all() -> &'static [(&'static str, Group)] {
    FIELDS
}

/// Whether a field is an internal key that is dropped from output.
#[must_use]
pub fn is_surrogate_key(field: &str) -> bool {
    SURROGATE_KEYS.contains(&field)
}

/// A validated, de-duplicated list of requested fields.
///
/// Always contains [`PATENT_NUMBER`], since every child row refers back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    fields: Vec<&'static str>,
}

impl FieldSelection {
    /// Validate field names against the catalog.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the list is empty or names an unknown field.
    pub fn new<I, S>(fields: I) -> FetchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: Vec<&'static str> = Vec::new();

        for field in fields {
            let field = field.as_ref().trim();
            if field.is_empty() {
                return Err(FetchError::validation("fields", "field names cannot be blank"));
            }

            let (&name, _) = CATALOG.get_key_value(field).ok_or_else(|| {
                FetchError::validation(
                    "fields",
                    format!("unknown field '{field}' for the patent endpoint"),
                )
            })?;

            if !selected.contains(&name) {
                selected.push(name);
            }
        }

        if selected.is_empty() {
            return Err(FetchError::validation("fields", "at least one field is required"));
        }

        if !selected.contains(&PATENT_NUMBER) {
            selected.push(PATENT_NUMBER);
        }

        Ok(Self { fields: selected })
    }

    /// Field names as sent to the API.
    #[must_use]
    pub fn as_slice(&self) -> &[&'static str] {
        &self.fields
    }

    /// Output columns of a group: `patent_number` first, then the requested
    /// fields of that group in request order, surrogate keys left out.
    ///
    /// Empty when nothing from the group was requested.
    #[must_use]
    pub fn columns_for(&self, group: Group) -> Vec<&'static str> {
        let own: Vec<&'static str> = self
            .fields
            .iter()
            .copied()
            .filter(|&f| f != PATENT_NUMBER && !is_surrogate_key(f) && group_of(f) == Some(group))
            .collect();

        if group.is_child() && own.is_empty() {
            return Vec::new();
        }

        std::iter::once(PATENT_NUMBER).chain(own).collect()
    }

    /// Groups that will produce a table, with their columns.
    #[must_use]
    pub fn groups(&self) -> BTreeMap<Group, Vec<&'static str>> {
        Group::ALL
            .into_iter()
            .map(|group| (group, self.columns_for(group)))
            .filter(|(_, columns)| !columns.is_empty())
            .collect()
    }
}
