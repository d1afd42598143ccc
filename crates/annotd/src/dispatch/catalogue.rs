//! Standard action catalogue.
//!
//! The annotation server exposes a fixed set of action names. Their
//! invocation style and capability flags are protocol facts shared with the
//! web client, so they live here as constant tables. Embedders bind handlers
//! to these names through
//! [`RegistryBuilder::register_standard`](super::RegistryBuilder::register_standard).
//!
//! Search actions appear twice (`...InDocument` and `...InCollection`) so
//! that whole-collection search can require authentication while
//! single-document search does not.

use strum::Display;

use super::registry::Capabilities;

/// How a handler receives its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum InvocationStyle {
    /// Whole request mapping.
    Expand,
    /// Bound positional values.
    Positional,
}

/// Catalogue entry for one standard action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardAction {
    /// Wire name.
    pub name: &'static str,
    /// Invocation style the handler must use.
    pub style: InvocationStyle,
    /// Capability flags.
    pub capabilities: Capabilities,
}

impl StandardAction {
    const fn positional(name: &'static str, capabilities: Capabilities) -> Self {
        Self {
            name,
            style: InvocationStyle::Positional,
            capabilities,
        }
    }

    const fn expand(name: &'static str) -> Self {
        Self {
            name,
            style: InvocationStyle::Expand,
            capabilities: Capabilities::NONE,
        }
    }
}

const PLAIN: Capabilities = Capabilities::NONE;
const LOGGED: Capabilities = Capabilities::NONE.logged();
const AUTHENTICATED: Capabilities = Capabilities::NONE.authenticated();
const ANNOTATION: Capabilities = Capabilities::ANNOTATION;

/// Name of the built-in action that lets clients append to the audit log.
pub const LOG_ANNOTATOR_ACTION: &str = "logAnnotatorAction";

/// Every action the server protocol defines.
pub const STANDARD_ACTIONS: &[StandardAction] = &[
    // Documents and collections.
    StandardAction::positional("getCollectionInformation", PLAIN),
    StandardAction::positional("getDocument", LOGGED),
    StandardAction::positional("getDocumentTimestamp", PLAIN),
    StandardAction::positional("importDocument", AUTHENTICATED),
    StandardAction::positional("deleteDocument", PLAIN),
    StandardAction::positional("deleteCollection", PLAIN),
    StandardAction::positional("getConfiguration", PLAIN),
    StandardAction::positional("convert", PLAIN),
    // Stored visualisations and downloads.
    StandardAction::positional("storeSVG", PLAIN),
    StandardAction::positional("retrieveStored", PLAIN),
    StandardAction::positional("downloadFile", PLAIN),
    StandardAction::positional("downloadCollection", PLAIN),
    // Accounts.
    StandardAction::positional("login", PLAIN),
    StandardAction::positional("logout", PLAIN),
    StandardAction::positional("whoami", PLAIN),
    StandardAction::expand("createNewUser"),
    // Annotation editing.
    StandardAction::positional("createSpan", ANNOTATION),
    StandardAction::positional("deleteSpan", ANNOTATION),
    StandardAction::positional("splitSpan", ANNOTATION),
    StandardAction::positional("createArc", ANNOTATION),
    StandardAction::positional("reverseArc", PLAIN),
    StandardAction::positional("deleteArc", ANNOTATION),
    StandardAction::positional("suggestSpanTypes", ANNOTATION),
    StandardAction::positional("undo", ANNOTATION),
    StandardAction::positional("tag", AUTHENTICATED),
    StandardAction::expand("createEntity"),
    StandardAction::expand("createSpanAllText"),
    StandardAction::expand("createSpanAllRe"),
    StandardAction::expand("fetchAllAnnotations"),
    // Search.
    StandardAction::positional("searchTextInDocument", PLAIN),
    StandardAction::positional("searchEntityInDocument", PLAIN),
    StandardAction::positional("searchEventInDocument", PLAIN),
    StandardAction::positional("searchRelationInDocument", PLAIN),
    StandardAction::positional("searchNoteInDocument", PLAIN),
    StandardAction::positional("searchTextInCollection", AUTHENTICATED),
    StandardAction::positional("searchEntityInCollection", AUTHENTICATED),
    StandardAction::positional("searchEventInCollection", AUTHENTICATED),
    StandardAction::positional("searchRelationInCollection", AUTHENTICATED),
    StandardAction::positional("searchNoteInCollection", AUTHENTICATED),
    // Client-side preferences and audit.
    StandardAction::positional(LOG_ANNOTATOR_ACTION, LOGGED),
    StandardAction::positional("saveConf", PLAIN),
    StandardAction::positional("loadConf", PLAIN),
    // Normalisation.
    StandardAction::positional("normGetName", PLAIN),
    StandardAction::positional("normSearch", PLAIN),
    StandardAction::positional("normData", PLAIN),
    // Labelling functions and model assistance.
    StandardAction::expand("labelingFunctionProcess"),
    StandardAction::expand("instantExecutor"),
    StandardAction::expand("addLabelingFunction"),
    StandardAction::expand("deleteLabelingFunction"),
    StandardAction::expand("getAvailableLabelingFunction"),
    StandardAction::expand("preprocessModelData"),
    StandardAction::expand("cacheModelResults"),
    // Workspace management.
    StandardAction::expand("createNewDocument"),
    StandardAction::expand("importNewDocument"),
    StandardAction::expand("deleteNewDocument"),
    StandardAction::expand("createFolder"),
];

/// Looks up a catalogue entry by wire name.
pub fn standard_action(name: &str) -> Option<&'static StandardAction> {
    STANDARD_ACTIONS.iter().find(|action| action.name == name)
}
