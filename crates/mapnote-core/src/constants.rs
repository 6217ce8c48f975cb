//! Shared identifiers and default timings.

/// Data source backing the pin marker.
pub const PIN_SOURCE_ID: &str = "mapnote-pin";
/// Pin shadow layer (bottom of the stack).
pub const PIN_SHADOW_LAYER_ID: &str = "mapnote-pin-shadow";
/// Pin body layer.
pub const PIN_BODY_LAYER_ID: &str = "mapnote-pin-body";
/// Pin inner highlight layer (top of the stack).
pub const PIN_HIGHLIGHT_LAYER_ID: &str = "mapnote-pin-highlight";

/// Data source backing the committed polygon.
pub const POLYGON_SOURCE_ID: &str = "mapnote-polygon";
/// Committed polygon fill layer.
pub const POLYGON_FILL_LAYER_ID: &str = "mapnote-polygon-fill";
/// Committed polygon outline layer.
pub const POLYGON_OUTLINE_LAYER_ID: &str = "mapnote-polygon-outline";

/// Data source mirroring the in-progress drawing.
pub const DRAFT_SOURCE_ID: &str = "mapnote-draft";
/// Draft outline layer.
pub const DRAFT_LINE_LAYER_ID: &str = "mapnote-draft-line";

/// Quiet period before a live polygon edit is committed (ms).
pub const LIVE_UPDATE_DEBOUNCE_MS: u64 = 100;
/// Quiet period before a search query is sent (ms).
pub const SEARCH_DEBOUNCE_MS: u64 = 300;
/// Queries shorter than this never reach the provider.
pub const MIN_SEARCH_QUERY_LEN: usize = 2;
/// Delay after the engine reports idle before pixels are read (ms).
pub const CAPTURE_SETTLE_DELAY_MS: u64 = 150;
/// Padding used when fitting the camera to a polygon (px).
pub const FIT_PADDING_PX: f64 = 40.0;

/// Placeholder preview width (px).
pub const PLACEHOLDER_WIDTH: u32 = 640;
/// Placeholder preview height (px).
pub const PLACEHOLDER_HEIGHT: u32 = 360;
/// Suggestions requested per search.
pub const SEARCH_RESULT_LIMIT: usize = 5;
/// Camera zoom after selecting a search suggestion.
pub const SEARCH_ZOOM: f64 = 15.0;
