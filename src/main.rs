use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use permuta_client::models::UserId;
use permuta_client::services::ImageUpload;
use permuta_client::views::{NoticeBoard, SaveOutcome};
use permuta_client::{
    ApiClient, AuthField, AuthForm, AuthOutcome, ClientConfig, ContactListView, FileTokenStore,
    LoadState, LogConfig, NotificationsView, ObjectUrlRegistry, ProfileState, ProfileView,
    RequestListView, Session, UserListView, VersionInfo, init_tracing,
};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "permuta", about = "Client for the teacher job-swap service")]
struct Cli {
    /// API base URL (overrides PERMUTA_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Session token file (overrides PERMUTA_TOKEN_FILE)
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the current profile
    Me,
    /// Edit name, e-mail, password or photo
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Image file to upload as the new photo
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Edit role, current institution and desired destinations
    Info {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        institution: Option<i64>,
        /// Desired institution id; repeat for several
        #[arg(long = "destination")]
        destinations: Vec<i64>,
        #[arg(long)]
        nearby: Option<bool>,
    },
    /// List other users available for a swap
    Users {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 5)]
        page_size: usize,
    },
    /// Send a swap request to a user
    Request {
        user_id: UserId,
        /// Skip the confirmation step
        #[arg(long)]
        yes: bool,
    },
    /// List pending requests addressed to you
    Requests {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Accept a pending request
    Accept { request_id: i64 },
    /// Reject a pending request
    Reject { request_id: i64 },
    /// List accepted swaps
    Contacts {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show notifications, optionally acting on one
    Notifications {
        #[arg(long, conflicts_with = "decline")]
        accept: Option<UserId>,
        #[arg(long)]
        decline: Option<UserId>,
    },
    /// Print build information
    Version,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Please log in first: permuta login --email <EMAIL> --password <PASSWORD>")]
    LoginRequired,

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Api(#[from] permuta_client::ApiError),

    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

struct App {
    api: ApiClient,
    session: Session,
    registry: ObjectUrlRegistry,
    config: ClientConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&LogConfig::from_env()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(token_file) = cli.token_file {
        config.token_file = token_file;
    }

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: ClientConfig) -> Result<(), CliError> {
    if let Command::Version = command {
        let info = VersionInfo::current();
        println!("permuta {} ({}, built {})", info.version, info.commit, info.build_time);
        return Ok(());
    }

    let session = Session::restore(FileTokenStore::new(&config.token_file));
    let api = ApiClient::new(config.clone(), session.clone(), None)?;
    let app = App {
        api,
        session,
        registry: ObjectUrlRegistry::new(),
        config,
    };
    debug!(base_url = %app.config.base_url, "Client ready");

    match command {
        Command::Login { email, password } => login(&app, &email, &password).await,
        Command::Register {
            name,
            email,
            password,
        } => register(&app, &name, &email, &password).await,
        Command::Logout => {
            let mut view = ProfileView::new(app.registry.clone(), app.config.notice_delay());
            view.logout(&app.session);
            println!("Logged out.");
            Ok(())
        }
        Command::Me => me(&app).await,
        Command::Profile {
            name,
            email,
            password,
            photo,
        } => edit_profile(&app, name, email, password, photo).await,
        Command::Info {
            role,
            institution,
            destinations,
            nearby,
        } => edit_info(&app, role, institution, destinations, nearby).await,
        Command::Users {
            search,
            page,
            page_size,
        } => users(&app, search, page, page_size).await,
        Command::Request { user_id, yes } => request_swap(&app, user_id, yes).await,
        Command::Requests { search } => requests(&app, search).await,
        Command::Accept { request_id } => resolve(&app, request_id, true).await,
        Command::Reject { request_id } => resolve(&app, request_id, false).await,
        Command::Contacts { search } => contacts(&app, search).await,
        Command::Notifications { accept, decline } => notifications(&app, accept, decline).await,
        Command::Version => Ok(()),
    }
}

async fn login(app: &App, email: &str, password: &str) -> Result<(), CliError> {
    let mut form = AuthForm::new();
    form.set_field(AuthField::Email, email);
    form.set_field(AuthField::Password, password);

    match form.submit(&app.api, &app.session).await {
        Some(AuthOutcome::LoggedIn { name, .. }) => {
            println!("Welcome, {name}!");
            Ok(())
        }
        _ => Err(form_error(&form)),
    }
}

async fn register(app: &App, name: &str, email: &str, password: &str) -> Result<(), CliError> {
    let mut form = AuthForm::new();
    form.toggle_mode();
    form.set_field(AuthField::Name, name);
    form.set_field(AuthField::Email, email);
    form.set_field(AuthField::Password, password);
    form.set_field(AuthField::ConfirmPassword, password);

    match form.submit(&app.api, &app.session).await {
        Some(AuthOutcome::Registered) => {
            println!("{}", form.general_message().unwrap_or("Registration complete."));
            Ok(())
        }
        _ => Err(form_error(&form)),
    }
}

fn form_error(form: &AuthForm) -> CliError {
    let mut messages: Vec<&str> = [
        AuthField::Name,
        AuthField::Email,
        AuthField::Password,
        AuthField::ConfirmPassword,
    ]
    .into_iter()
    .filter_map(|field| form.errors().get(field))
    .collect();
    messages.extend(form.general_message());
    CliError::Failed(messages.join("\n"))
}

/// Load the profile screen; fails when there is no usable session
async fn load_profile(app: &App) -> Result<ProfileView, CliError> {
    let mut view = ProfileView::new(app.registry.clone(), app.config.notice_delay());
    view.load(&app.api).await;
    match view.state() {
        ProfileState::Ready => Ok(view),
        _ => match notice_text(view.notices()) {
            Some(text) => Err(CliError::Failed(text)),
            None => Err(CliError::LoginRequired),
        },
    }
}

async fn me(app: &App) -> Result<(), CliError> {
    let view = load_profile(app).await?;
    let Some(user) = view.user() else {
        return Err(CliError::LoginRequired);
    };

    println!("{} <{}>", view.display_name(), user.email);
    println!("Role:         {}", user.role.as_deref().unwrap_or("Not informed"));
    if let Some(institution) = user.current_institution {
        println!("Institution:  #{institution}");
    }
    if !user.desired_institutions.is_empty() {
        let wanted: Vec<String> = user
            .desired_institutions
            .iter()
            .map(|id| format!("#{id}"))
            .collect();
        println!("Destinations: {}", wanted.join(", "));
    }
    println!("Nearby:       {}", if user.accepts_nearby { "yes" } else { "no" });
    println!("Member since: {}", view.member_since());
    println!("Photo:        {}", view.photo().src());

    let mut notifications = NotificationsView::new(app.config.notice_delay());
    notifications.refresh_count(&app.api).await;
    if let Some(badge) = notifications.badge() {
        println!("Notifications: {badge}");
    }
    Ok(())
}

async fn edit_profile(
    app: &App,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    photo: Option<PathBuf>,
) -> Result<(), CliError> {
    let image = match photo {
        Some(path) => Some(read_image(&path).await?),
        None => None,
    };

    let mut view = load_profile(app).await?;
    view.open_profile_editor();
    if let Some(name) = name {
        view.fields.name = name;
    }
    if let Some(email) = email {
        view.fields.email = email;
    }
    if let Some(editor) = view.profile_editor_mut() {
        editor.new_password = password.unwrap_or_default();
        editor.new_image = image;
    }

    let outcome = view.save_profile(&app.api).await;
    report_save(outcome, &view)
}

async fn edit_info(
    app: &App,
    role: Option<String>,
    institution: Option<i64>,
    destinations: Vec<i64>,
    nearby: Option<bool>,
) -> Result<(), CliError> {
    let mut view = load_profile(app).await?;
    if !view.open_info_editor(&app.api).await {
        if view.state() == ProfileState::Guest {
            return Err(CliError::LoginRequired);
        }
        return Err(CliError::Failed(
            notice_text(view.notices()).unwrap_or_else(|| "Could not open the editor.".into()),
        ));
    }

    if let Some(editor) = view.info_editor_mut() {
        if let Some(role) = role {
            editor.role = role;
        }
        if institution.is_some() {
            editor.current_institution = institution;
        }
        if let Some(nearby) = nearby {
            editor.accepts_nearby = nearby;
        }
        if !destinations.is_empty() {
            loop {
                let last = editor.destinations().len() - 1;
                if !editor.remove_destination(last) {
                    break;
                }
            }
            for (index, id) in destinations.into_iter().enumerate() {
                if index > 0 {
                    editor.add_destination();
                }
                editor.set_destination(index, Some(id));
            }
        }
    }

    let outcome = view.save_info(&app.api).await;
    report_save(outcome, &view)
}

fn report_save(outcome: SaveOutcome, view: &ProfileView) -> Result<(), CliError> {
    let text = notice_text(view.notices());
    match outcome {
        SaveOutcome::Failed if view.state() == ProfileState::Guest => Err(CliError::LoginRequired),
        SaveOutcome::Saved | SaveOutcome::NoChanges => {
            println!("{}", text.unwrap_or_else(|| "Done.".into()));
            Ok(())
        }
        _ => Err(CliError::Failed(
            text.unwrap_or_else(|| "Nothing was saved.".into()),
        )),
    }
}

async fn users(
    app: &App,
    search: Option<String>,
    page: usize,
    page_size: usize,
) -> Result<(), CliError> {
    let me = current_user_id(app).await?;
    let mut view = UserListView::new(me, app.registry.clone(), app.config.notice_delay());
    view.load(&app.api).await;
    check_loaded(view.load_state())?;

    if !view.set_page_size(page_size) {
        return Err(CliError::Failed(format!(
            "Page size must be one of {:?}",
            permuta_client::utils::PAGE_SIZE_OPTIONS
        )));
    }
    if let Some(search) = search {
        view.set_query(search);
    }
    view.set_page(page.saturating_sub(1));

    let rows = view.page_rows();
    if rows.is_empty() {
        println!("No users found.");
        return Ok(());
    }
    for user in rows {
        println!(
            "{:>5}  {:<30}  {:<30}  {:<20}  {}",
            user.id,
            user.name,
            user.institution_name().unwrap_or("-"),
            user.role_label(),
            view.avatar(user.id)
        );
    }
    println!(
        "Page {} of {} ({} matching)",
        view.pager().page() + 1,
        view.page_count(),
        view.filtered().len()
    );
    Ok(())
}

async fn request_swap(app: &App, target: UserId, confirmed: bool) -> Result<(), CliError> {
    let me = current_user_id(app).await?;
    let mut view = UserListView::new(me, app.registry.clone(), app.config.notice_delay());
    view.load(&app.api).await;
    check_loaded(view.load_state())?;

    if !view.ask_swap(target) {
        return Err(CliError::Failed(format!("No user with id {target}.")));
    }
    if !confirmed {
        if let Some(user) = view.pending_confirmation() {
            println!(
                "Send a swap request to {}? Re-run with --yes to confirm.",
                user.name
            );
        }
        view.cancel_swap();
        return Ok(());
    }

    let sent = view.confirm_swap(&app.api).await;
    let text = notice_text(view.notices());
    if sent {
        println!("{}", text.unwrap_or_else(|| "Request sent.".into()));
        Ok(())
    } else {
        Err(CliError::Failed(
            text.unwrap_or_else(|| "The request was not sent.".into()),
        ))
    }
}

async fn requests(app: &App, search: Option<String>) -> Result<(), CliError> {
    let me = current_user_id(app).await?;
    let mut view = RequestListView::new(me, app.registry.clone(), app.config.notice_delay());
    view.load(&app.api).await;
    check_loaded(view.load_state())?;

    if let Some(search) = search {
        view.set_query(search);
    }
    let rows = view.filtered();
    if rows.is_empty() {
        println!("No pending requests.");
        return Ok(());
    }
    for request in rows {
        println!(
            "{:>5}  {:<30}  {:<30}  {}",
            request.id,
            request.requester.name,
            request.requester.institution_name().unwrap_or("-"),
            view.avatar(request.requester.id)
        );
    }
    Ok(())
}

async fn resolve(app: &App, request_id: i64, accept: bool) -> Result<(), CliError> {
    let me = current_user_id(app).await?;
    let mut view = RequestListView::new(me, app.registry.clone(), app.config.notice_delay());
    view.load(&app.api).await;
    check_loaded(view.load_state())?;

    if !view.select(request_id) {
        return Err(CliError::Failed(format!(
            "No pending request with id {request_id}."
        )));
    }
    let done = if accept {
        view.accept(&app.api, request_id).await
    } else {
        view.reject(&app.api, request_id).await
    };

    let text = notice_text(view.notices());
    if done {
        println!("{}", text.unwrap_or_else(|| "Done.".into()));
        Ok(())
    } else {
        check_loaded(view.load_state())?;
        Err(CliError::Failed(
            text.unwrap_or_else(|| "The request was not updated.".into()),
        ))
    }
}

async fn contacts(app: &App, search: Option<String>) -> Result<(), CliError> {
    let me = current_user_id(app).await?;
    let mut view = ContactListView::new(me, app.registry.clone());
    view.load(&app.api).await;
    check_loaded(view.load_state())?;

    if let Some(search) = search {
        view.set_query(search);
    }
    let rows = view.filtered();
    if rows.is_empty() {
        println!("No contacts yet.");
        return Ok(());
    }
    for contact in rows {
        println!(
            "{:>5}  {:<30}  {:<30}  {:<20}  {}",
            contact.id,
            contact.name,
            contact.email,
            contact.role_label(),
            view.avatar(contact.id)
        );
    }
    Ok(())
}

async fn notifications(
    app: &App,
    accept: Option<UserId>,
    decline: Option<UserId>,
) -> Result<(), CliError> {
    let mut view = NotificationsView::new(app.config.notice_delay());
    view.load(&app.api).await;
    check_loaded(view.load_state())?;

    let acted = match (accept, decline) {
        (Some(id), _) => Some(view.accept(&app.api, id).await),
        (None, Some(id)) => Some(view.decline(&app.api, id).await),
        (None, None) => None,
    };
    if acted == Some(false) {
        return Err(CliError::Failed(
            notice_text(view.notices()).unwrap_or_else(|| "Nothing was changed.".into()),
        ));
    }

    view.refresh_count(&app.api).await;
    match view.badge() {
        Some(badge) => println!("{badge} pending"),
        None => println!("No notifications."),
    }
    for item in view.items() {
        println!("{:>5}  {}", item.id, item.name);
    }
    Ok(())
}

async fn current_user_id(app: &App) -> Result<UserId, CliError> {
    let view = load_profile(app).await?;
    view.user().map(|u| u.id).ok_or(CliError::LoginRequired)
}

fn check_loaded(state: &LoadState) -> Result<(), CliError> {
    match state {
        LoadState::LoginRequired => Err(CliError::LoginRequired),
        LoadState::Failed(message) => Err(CliError::Failed(message.clone())),
        _ => Ok(()),
    }
}

fn notice_text(notices: &NoticeBoard) -> Option<String> {
    notices.current().map(|n| n.text.clone())
}

async fn read_image(path: &Path) -> Result<ImageUpload, CliError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let content_type = match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo")
        .to_string();

    Ok(ImageUpload {
        file_name,
        content_type: content_type.to_string(),
        bytes,
    })
}
