use std::path::Path;

use iced::widget::{column, container, row, vertical_rule, Column};
use iced::{Element, Length, Task, Theme};
use rfd::FileDialog;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// Declare the application modules
mod config;
mod report;
mod shell;
mod state;
mod ui;

use config::AppConfig;
use report::ReportFormat;
use state::error::{LedgerError, LedgerResult};
use state::form::looks_like_url;
use state::library::Library;
use state::session::{Session, TypeFilter};
use ui::asset_form::{FormEditors, FormMessage, ProofTarget};
use ui::project_editor::{EditorMessage, ProjectEditor};
use ui::type_manager::{TypeManager, TypesMessage};
use ui::Notice;

/// Start-up failures that end the program
#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("window system error: {0}")]
    Gui(#[from] iced::Error),
}

/// Modal content that replaces the main panels while open
enum Dialog {
    Project(ProjectEditor),
    Types(TypeManager),
}

/// Main application state
struct LicenseKeeper {
    /// Database connection plus everything the main window shows
    session: Session,
    config: AppConfig,
    /// Buffers for the asset form's multi-line fields
    editors: FormEditors,
    dialog: Option<Dialog>,
    notice: Option<Notice>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    SelectProject(i64),
    NewProject,
    EditProject,
    DeleteProject,
    ProjectEditor(EditorMessage),
    SelectAsset(i64),
    NewAsset,
    DeleteAsset,
    FilterSelected(TypeFilter),
    Export(ReportFormat),
    Form(FormMessage),
    SaveAsset,
    OpenUrl,
    CopyUrl,
    BrowseProof(ProofTarget),
    OpenProof,
    ManageTypes,
    Types(TypesMessage),
    DismissNotice,
    ShowAbout,
}

impl LicenseKeeper {
    fn new(session: Session, config: AppConfig) -> (Self, Task<Message>) {
        let mut editors = FormEditors::default();
        editors.sync(session.form());
        (
            LicenseKeeper {
                session,
                config,
                editors,
                dialog: None,
                notice: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let result = match message {
            Message::Form(edit) => {
                // Pure field edits keep the editor buffers as they are
                ui::asset_form::apply(self.session.form_mut(), &mut self.editors, edit);
                return Task::none();
            }
            Message::SelectProject(id) => self.session.select_project(id).map(|_| None),
            Message::NewProject => {
                self.dialog = Some(Dialog::Project(ProjectEditor::create()));
                Ok(None)
            }
            Message::EditProject => {
                if let Some(project) = self.session.current_project() {
                    self.dialog = Some(Dialog::Project(ProjectEditor::edit(project)));
                }
                Ok(None)
            }
            Message::DeleteProject => self.delete_project(),
            Message::ProjectEditor(edit) => self.project_editor(edit),
            Message::SelectAsset(id) => self.session.select_asset(id).map(|_| None),
            Message::NewAsset => self.session.new_asset().map(|_| None),
            Message::DeleteAsset => self.delete_asset(),
            Message::FilterSelected(filter) => {
                self.session.set_filter(filter);
                Ok(None)
            }
            Message::Export(format) => self.export(format),
            Message::SaveAsset => self
                .session
                .save_asset()
                .map(|_| Some(Notice::info("Saved", "Asset saved."))),
            Message::OpenUrl => self.open_url(),
            Message::CopyUrl => {
                let url = self.session.form().source_url.trim().to_string();
                return iced::clipboard::write(url);
            }
            Message::BrowseProof(target) => {
                self.browse_proof(target);
                return Task::none();
            }
            Message::OpenProof => {
                let proof = self.session.form().proof_path.trim().to_string();
                shell::open_path(Path::new(&proof)).map(|_| None)
            }
            Message::ManageTypes => {
                self.dialog = Some(Dialog::Types(TypeManager::new()));
                Ok(None)
            }
            Message::Types(message) => self.type_manager(message),
            Message::DismissNotice => {
                self.notice = None;
                return Task::none();
            }
            Message::ShowAbout => {
                ui::show_about(self.session.library().path());
                return Task::none();
            }
        };

        match result {
            Ok(Some(notice)) => self.notice = Some(notice),
            Ok(None) => {}
            Err(err) => {
                warn!(%err, "action failed");
                self.notice = Some(Notice::from(&err));
            }
        }
        self.editors.sync(self.session.form());
        Task::none()
    }

    fn delete_project(&mut self) -> LedgerResult<Option<Notice>> {
        let Some(project) = self.session.current_project() else {
            return Ok(None);
        };
        let question = format!(
            "Delete project '{}' and all of its assets? This cannot be undone.",
            project.fields.name
        );
        if !ui::confirm("Delete project", &question) {
            return Ok(None);
        }
        self.session.delete_selected_project()?;
        Ok(None)
    }

    fn delete_asset(&mut self) -> LedgerResult<Option<Notice>> {
        let Some(asset) = self.session.selected_asset() else {
            return Ok(None);
        };
        let question = format!("Delete asset '{}'?", asset.fields.name);
        if !ui::confirm("Delete asset", &question) {
            return Ok(None);
        }
        self.session.delete_selected_asset()?;
        Ok(None)
    }

    fn project_editor(&mut self, message: EditorMessage) -> LedgerResult<Option<Notice>> {
        let Some(Dialog::Project(editor)) = self.dialog.as_mut() else {
            return Ok(None);
        };
        match message {
            EditorMessage::Cancel => self.dialog = None,
            EditorMessage::Save => {
                // The dialog stays open when validation fails
                self.session.save_project(editor.editing, &editor.form)?;
                self.dialog = None;
            }
            other => editor.update(other),
        }
        Ok(None)
    }

    fn type_manager(&mut self, message: TypesMessage) -> LedgerResult<Option<Notice>> {
        let Some(Dialog::Types(manager)) = self.dialog.as_mut() else {
            return Ok(None);
        };
        if let TypesMessage::Close = message {
            self.dialog = None;
            return Ok(None);
        }
        let status = manager.update(&mut self.session, message)?;
        Ok(status.map(|body| Notice::info("Asset types", body)))
    }

    fn open_url(&mut self) -> LedgerResult<Option<Notice>> {
        let url = self.session.form().source_url.trim().to_string();
        if url.is_empty() {
            return Ok(None);
        }
        if !looks_like_url(&url)
            && !ui::confirm(
                "Open URL",
                &format!("'{url}' does not start with http:// or https://. Open it anyway?"),
            )
        {
            return Ok(None);
        }
        shell::open_url(&url)?;
        Ok(None)
    }

    fn browse_proof(&mut self, target: ProofTarget) {
        let dialog = FileDialog::new().set_title("Select proof of license");
        let picked = match target {
            ProofTarget::File => dialog.pick_file(),
            ProofTarget::Folder => dialog.pick_folder(),
        };
        if let Some(path) = picked {
            self.session.form_mut().proof_path = path.display().to_string();
        }
    }

    fn export(&mut self, format: ReportFormat) -> LedgerResult<Option<Notice>> {
        let Some(project) = self.session.current_project() else {
            return Err(LedgerError::validation("Select a project first."));
        };
        let file_name = format!("{}.{}", project.fields.name.trim(), format.extension());

        let export_dir = self.config.export_dir();
        if let Err(err) = std::fs::create_dir_all(&export_dir) {
            warn!(dir = %export_dir.display(), %err, "could not create export directory");
        }

        let Some(path) = FileDialog::new()
            .set_title("Export report")
            .set_directory(&export_dir)
            .set_file_name(&file_name)
            .add_filter(format.to_string(), &[format.extension()])
            .save_file()
        else {
            return Ok(None);
        };

        let content = self.session.report(format)?;
        report::write_report(&path, &content)?;
        self.config.remember_export(&path);

        Ok(Some(Notice::info(
            "Export complete",
            format!("Report written to {}", path.display()),
        )))
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let body: Element<Message> = match &self.dialog {
            Some(Dialog::Project(editor)) => editor.view(),
            Some(Dialog::Types(manager)) => manager.view(&self.session),
            None => row![
                ui::projects::project_panel(&self.session),
                vertical_rule(1),
                ui::assets::asset_panel(&self.session),
                vertical_rule(1),
                ui::asset_form::form_panel(&self.session, &self.editors),
            ]
            .spacing(16)
            .height(Length::Fill)
            .into(),
        };

        let content: Column<Message> = column![]
            .push_maybe(self.notice.as_ref().map(ui::notice_banner))
            .push(body)
            .spacing(12)
            .padding(16);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("license_keeper=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run() -> Result<(), AppError> {
    let config = AppConfig::load();
    let db_path = config.database_path();
    let library = Library::open(&db_path)?;
    info!(
        path = %db_path.display(),
        projects = library.project_count().unwrap_or(0),
        assets = library.asset_count().unwrap_or(0),
        "License Keeper initialized"
    );
    let session = Session::new(library)?;

    iced::application("License Keeper", LicenseKeeper::update, LicenseKeeper::view)
        .theme(LicenseKeeper::theme)
        .centered()
        .run_with(move || LicenseKeeper::new(session, config))?;
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn main() {
    init_logging();

    let failure = match std::panic::catch_unwind(run) {
        Ok(Ok(())) => return,
        Ok(Err(err)) => err.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };

    error!(error = %failure, "License Keeper stopped");
    eprintln!("\nLicense Keeper stopped: {failure}\nPress Enter to close...");
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
    std::process::exit(1);
}
