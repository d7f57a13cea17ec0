use crate::api::types::{ApiError, GenerationPayload, ImageAnalysis, PosterArt};

pub const GREETING: &str = "Hi! Pick a language & start! 👇";
pub const VALIDATION_NOTICE: &str = "Please enter a Business Name and Product Description!";
pub const NETWORK_ERROR_NOTICE: &str = "❌ Network Error.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Text,
    Image,
}

/// One transcript line. Entries are immutable once appended; the transcript
/// only ever grows at the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub role: Role,
    pub kind: EntryKind,
    pub content: String,
}

impl ChatEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            kind: EntryKind::Text,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            kind: EntryKind::Text,
            content: content.into(),
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            kind: EntryKind::Image,
            content: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Slogan,
    Poster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Idle,
    ChoosingInput,
    ManualEntry,
    ImageUpload,
    AwaitingResult(GenerationKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Spanish,
    French,
    German,
    Tamil,
    Marathi,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::Hindi,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Tamil,
        Language::Marathi,
    ];

    /// The value sent to the service and echoed in transcript entries.
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Tamil => "Tamil",
            Language::Marathi => "Marathi",
        }
    }

    pub fn flag_label(self) -> &'static str {
        match self {
            Language::English => "🇬🇧 English",
            Language::Hindi => "🇮🇳 Hindi (हिंदी)",
            Language::Spanish => "🇪🇸 Spanish",
            Language::French => "🇫🇷 French",
            Language::German => "🇩🇪 German",
            Language::Tamil => "🇮🇳 Tamil",
            Language::Marathi => "🇮🇳 Marathi",
        }
    }

    /// Dictation recognizer locale. Unmapped selections fall back to
    /// English's locale at the adapter.
    pub fn locale(self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Spanish => "es-ES",
            Language::French => "fr-FR",
            Language::German => "de-DE",
            Language::Tamil => "ta-IN",
            Language::Marathi => "mr-IN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdTone {
    #[default]
    Catchy,
    Professional,
    Luxury,
    Humorous,
}

impl AdTone {
    pub const ALL: [AdTone; 4] = [
        AdTone::Catchy,
        AdTone::Professional,
        AdTone::Luxury,
        AdTone::Humorous,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AdTone::Catchy => "Catchy",
            AdTone::Professional => "Professional",
            AdTone::Luxury => "Luxury",
            AdTone::Humorous => "Humorous",
        }
    }

    /// The analysis endpoint guesses a tone as free text; adopt it only when
    /// it names one of ours.
    pub fn from_response(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|tone| tone.label().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PosterFormat {
    #[default]
    Square,
    Portrait,
    Landscape,
}

impl PosterFormat {
    pub const ALL: [PosterFormat; 3] = [
        PosterFormat::Square,
        PosterFormat::Portrait,
        PosterFormat::Landscape,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PosterFormat::Square => "Square",
            PosterFormat::Portrait => "Portrait",
            PosterFormat::Landscape => "Landscape",
        }
    }
}

/// The Mode Controller's authoritative model: current mode, form fields, and
/// the transcript. The egui layer is a projection of this state and never
/// mutates it directly.
pub struct ChatState {
    pub mode: UiMode,
    pub open: bool,
    pub transcript: Vec<ChatEntry>,
    pub language: Language,
    pub business_name: String,
    pub ad_tone: AdTone,
    pub product_description: String,
    pub format: PosterFormat,
    pub analysis_busy: bool,
    pub slogan_busy: bool,
    pub poster_busy: bool,
    pub validation_notice: Option<String>,
    pub scroll_to_bottom: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            mode: UiMode::Idle,
            open: false,
            transcript: Vec::new(),
            language: Language::English,
            business_name: String::new(),
            ad_tone: AdTone::Catchy,
            product_description: String::new(),
            format: PosterFormat::Square,
            analysis_busy: false,
            slogan_busy: false,
            poster_busy: false,
            validation_notice: None,
            scroll_to_bottom: false,
        }
    }

    pub fn append(&mut self, entry: ChatEntry) {
        self.transcript.push(entry);
        self.scroll_to_bottom = true;
    }

    /// Opening (or reopening) the chat resets the transcript to the greeting
    /// and re-creates the chooser with the language back at English. Form
    /// field values deliberately survive a close/reopen cycle.
    pub fn open_chat(&mut self) {
        self.open = true;
        self.mode = UiMode::ChoosingInput;
        self.language = Language::English;
        self.validation_notice = None;
        self.transcript.clear();
        self.append(ChatEntry::bot(GREETING));
    }

    /// Hides the transcript view only; mode, session, and in-flight requests
    /// are untouched.
    pub fn close_chat(&mut self) {
        self.open = false;
    }

    pub fn chooser_visible(&self) -> bool {
        self.mode == UiMode::ChoosingInput
    }

    pub fn form_visible(&self) -> bool {
        matches!(self.mode, UiMode::ManualEntry | UiMode::AwaitingResult(_))
    }

    pub fn choose_manual(&mut self) {
        if self.mode != UiMode::ChoosingInput {
            return;
        }
        self.append(ChatEntry::user(format!(
            "✍️ Manual Mode selected ({}).",
            self.language.name()
        )));
        self.append(ChatEntry::bot("Okay! Fill in the form below."));
        self.mode = UiMode::ManualEntry;
    }

    /// A file was actually picked; announce the upload and move to
    /// ImageUpload. Returns false when no analysis should be dispatched.
    pub fn file_picked(&mut self) -> bool {
        if self.mode != UiMode::ChoosingInput {
            return false;
        }
        self.append(ChatEntry::user("📸 Uploading image..."));
        self.append(ChatEntry::bot("Analyzing image details... 🧠"));
        self.mode = UiMode::ImageUpload;
        self.analysis_busy = true;
        true
    }

    pub fn analysis_finished(&mut self, result: Result<ImageAnalysis, ApiError>) {
        self.analysis_busy = false;
        match result {
            Ok(analysis) => {
                self.business_name = analysis.business_type;
                self.product_description = analysis.description;
                if let Some(tone) = analysis
                    .tone
                    .as_deref()
                    .and_then(AdTone::from_response)
                {
                    self.ad_tone = tone;
                }
                self.append(ChatEntry::bot(format!(
                    "I see: \"{}\".",
                    self.product_description
                )));
                self.append(ChatEntry::bot(format!(
                    "Form auto-filled! Ready to generate in {}?",
                    self.language.name()
                )));
            }
            Err(ApiError::Application(message)) => {
                self.append(ChatEntry::bot(format!("❌ Error: {message}")));
            }
            Err(ApiError::Network(_)) => {
                self.append(ChatEntry::bot(NETWORK_ERROR_NOTICE));
            }
            // The gateway already re-showed the login surface.
            Err(ApiError::Auth) => {}
        }

        // The form is revealed even after a failed analysis so the user can
        // fill in (or fix) the fields manually.
        if self.mode == UiMode::ImageUpload {
            self.mode = UiMode::ManualEntry;
        }
    }

    /// Validates the form and, when it passes, records the user intent and
    /// returns the payload to dispatch. On validation failure no network
    /// call happens and the mode is unchanged.
    pub fn request_generation(&mut self, kind: GenerationKind) -> Option<GenerationPayload> {
        let busy = match kind {
            GenerationKind::Slogan => self.slogan_busy,
            GenerationKind::Poster => self.poster_busy,
        };
        if busy {
            return None;
        }

        self.validation_notice = None;
        let business = self.business_name.trim();
        let description = self.product_description.trim();
        if business.is_empty() || description.is_empty() {
            self.validation_notice = Some(VALIDATION_NOTICE.to_string());
            return None;
        }

        let payload = GenerationPayload {
            business_type: business.to_string(),
            ad_type: self.ad_tone.label().to_string(),
            product_description: description.to_string(),
            language: self.language.name().to_string(),
            format: match kind {
                GenerationKind::Slogan => None,
                GenerationKind::Poster => Some(self.format.label().to_string()),
            },
        };

        match kind {
            GenerationKind::Slogan => {
                self.append(ChatEntry::user(format!(
                    "📝 Generating {} slogan...",
                    self.language.name()
                )));
                self.slogan_busy = true;
            }
            GenerationKind::Poster => {
                self.append(ChatEntry::user(format!(
                    "🎬 Designing {} ad...",
                    self.format.label()
                )));
                self.poster_busy = true;
            }
        }
        self.mode = UiMode::AwaitingResult(kind);
        Some(payload)
    }

    pub fn slogan_finished(&mut self, result: Result<String, ApiError>) {
        self.slogan_busy = false;
        match result {
            Ok(slogan) => self.append(ChatEntry::bot(format!("✨ \"{slogan}\""))),
            Err(ApiError::Application(message)) => {
                self.append(ChatEntry::bot(format!("❌ Error: {message}")));
            }
            Err(ApiError::Network(_)) => self.append(ChatEntry::bot(NETWORK_ERROR_NOTICE)),
            Err(ApiError::Auth) => {}
        }
        self.settle_mode();
    }

    pub fn poster_finished(&mut self, result: Result<PosterArt, ApiError>) {
        self.poster_busy = false;
        match result {
            Ok(art) => {
                self.append(ChatEntry::bot("✨ Poster Ready!"));
                self.append(ChatEntry::image(art.image_url));
                self.append(ChatEntry::bot(format!("Slogan: \"{}\"", art.slogan)));
            }
            Err(ApiError::Application(message)) => {
                self.append(ChatEntry::bot(format!("❌ Error: {message}")));
            }
            Err(ApiError::Network(_)) => self.append(ChatEntry::bot(NETWORK_ERROR_NOTICE)),
            Err(ApiError::Auth) => {}
        }
        self.settle_mode();
    }

    /// Appends a finalized dictation transcript to the description field,
    /// space-separated, never overwriting existing text.
    pub fn append_dictation(&mut self, transcript: &str) {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return;
        }
        if self.product_description.is_empty() {
            self.product_description = transcript.to_string();
        } else {
            self.product_description.push(' ');
            self.product_description.push_str(transcript);
        }
    }

    // A completion only moves the mode while we are actually awaiting one;
    // a reopened chooser keeps its state even when a late result lands.
    fn settle_mode(&mut self) {
        if !matches!(self.mode, UiMode::AwaitingResult(_)) {
            return;
        }
        self.mode = if self.slogan_busy {
            UiMode::AwaitingResult(GenerationKind::Slogan)
        } else if self.poster_busy {
            UiMode::AwaitingResult(GenerationKind::Poster)
        } else {
            UiMode::ManualEntry
        };
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}
