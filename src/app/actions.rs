#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    ToggleAutoDetect,
    ToggleFollow,

    OffsetIncrease,
    OffsetDecrease,

    ScrollUp,
    ScrollDown,
    GoTop,
    GoBottom,

    OpenSearch,
    OpenCachedSongs,
    CloseModal,

    InputChar(char),
    Backspace,
    SubmitSearch,

    CachedCursorUp,
    CachedCursorDown,
    ActivateCachedSong,

    ClearCache,

    Resize,
}
