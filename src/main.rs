//! Avatar Arcade entry point
//!
//! In the browser this wires the DOM to the avatar generator, the gallery
//! and the mini-game. Natively it derives one avatar and plays a headless
//! session with a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent};

    use avatar_arcade::audio::{AudioManager, SoundEffect};
    use avatar_arcade::consts::*;
    use avatar_arcade::sim::{
        Command, Facing, FrameOutcome, FrameToken, GameEvent, GameSession, IntervalOutcome,
        RunState, Scheduler, TimerUrgency,
    };
    use avatar_arcade::{Avatar, Gallery, GalleryEntry, Settings, Tuning, generate_avatar};

    /// Delay before the avatar card flips
    const REVEAL_DELAY_MS: i32 = 1500;
    const PARTICLES_PER_CATCH: usize = 8;
    const PARTICLE_LIFETIME_MS: i32 = 1000;
    const BUBBLE_LIFETIME_MS: i32 = 4000;
    const FOOD_IMAGE: &str = "ai/arcium.jpg";

    #[wasm_bindgen(inline_js = "
        export function copy_text(text) {
            if (navigator.clipboard) {
                navigator.clipboard.writeText(text);
            }
        }

        export async function share_or_copy(title, text) {
            try {
                await navigator.share({ title, text, url: window.location.href });
            } catch (e) {
                if (navigator.clipboard) {
                    await navigator.clipboard.writeText(text);
                }
                alert('Code copied to clipboard!');
            }
        }
    ")]
    extern "C" {
        fn copy_text(text: &str);
        /// Falls back to the clipboard (and tells the user) when sharing is unavailable
        fn share_or_copy(title: &str, text: &str) -> js_sys::Promise;
    }

    fn window() -> Option<web_sys::Window> {
        web_sys::window()
    }

    fn document() -> Option<Document> {
        window()?.document()
    }

    fn html_by_id(document: &Document, id: &str) -> Option<HtmlElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn set_style(el: &HtmlElement, prop: &str, value: &str) {
        let _ = el.style().set_property(prop, value);
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        match document.get_element_by_id(id) {
            Some(el) => el.set_text_content(Some(text)),
            None => log::warn!("Missing element #{}", id),
        }
    }

    fn viewport_width() -> f64 {
        window()
            .and_then(|w| w.inner_width().ok())
            .and_then(|v| v.as_f64())
            .unwrap_or(1024.0)
    }

    fn on_event(target: &web_sys::EventTarget, event: &str, f: impl FnMut(web_sys::Event) + 'static) {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(f);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn after(ms: i32, f: impl FnOnce() + 'static) {
        let Some(window) = window() else { return };
        let closure = Closure::once_into_js(f);
        let _ = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(closure.unchecked_ref(), ms);
    }

    /// Maps simulation state onto DOM elements inside `#gameArea`
    struct DomSurface {
        document: Document,
        foods: HashMap<u32, HtmlElement>,
    }

    impl DomSurface {
        fn new(document: Document) -> Self {
            Self {
                document,
                foods: HashMap::new(),
            }
        }

        fn area(&self) -> Option<Element> {
            self.document.get_element_by_id("gameArea")
        }

        fn create_div(&self, class: &str) -> Option<HtmlElement> {
            let el: HtmlElement = self.document.create_element("div").ok()?.dyn_into().ok()?;
            el.set_class_name(class);
            Some(el)
        }

        /// Drop every visual left from the previous session
        fn reset(&mut self) {
            if let Some(area) = self.area() {
                if let Ok(nodes) = area.query_selector_all(".food, .bubble, .particle") {
                    for i in 0..nodes.length() {
                        if let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                            el.remove();
                        }
                    }
                }
            }
            self.foods.clear();

            for id in ["gameOver", "pauseScreen"] {
                if let Some(el) = html_by_id(&self.document, id) {
                    set_style(&el, "display", "none");
                }
            }
        }

        fn apply(&mut self, event: &GameEvent, audio: &AudioManager) {
            match *event {
                GameEvent::FoodSpawned { id, pos } => {
                    let (Some(area), Some(food)) = (self.area(), self.create_div("food")) else {
                        return;
                    };
                    set_style(&food, "left", &format!("{}px", pos.x));
                    set_style(&food, "top", &format!("{}px", pos.y));
                    if let Ok(img) = self.document.create_element("img") {
                        let _ = img.set_attribute("src", FOOD_IMAGE);
                        let _ = img.set_attribute("alt", "Irys");
                        let _ = food.append_child(&img);
                    }
                    let _ = area.append_child(&food);
                    self.foods.insert(id, food);
                }
                GameEvent::FoodCaught { id, pos, .. } => {
                    self.remove_food(id);
                    self.burst(pos.x, pos.y);
                    audio.play(SoundEffect::Catch);
                }
                GameEvent::FoodMissed { id } => self.remove_food(id),
                GameEvent::Bubble { x, size } => {
                    let (Some(area), Some(bubble)) = (self.area(), self.create_div("bubble")) else {
                        return;
                    };
                    set_style(&bubble, "width", &format!("{}px", size));
                    set_style(&bubble, "height", &format!("{}px", size));
                    set_style(&bubble, "left", &format!("{}px", x));
                    set_style(&bubble, "bottom", "0px");
                    let _ = area.append_child(&bubble);
                    after(BUBBLE_LIFETIME_MS, move || bubble.remove());
                }
                GameEvent::LevelUp { level } => {
                    log::debug!("Level up to {}", level);
                    audio.play(SoundEffect::LevelUp);
                }
                GameEvent::GameOver { score, level } => {
                    set_text(&self.document, "finalScore", &score.to_string());
                    set_text(&self.document, "finalLevel", &level.to_string());
                    if let Some(el) = html_by_id(&self.document, "gameOver") {
                        set_style(&el, "display", "block");
                    }
                    audio.play(SoundEffect::TimeUp);
                }
            }
        }

        fn remove_food(&mut self, id: u32) {
            match self.foods.remove(&id) {
                Some(el) => el.remove(),
                None => log::warn!("No element for food {}", id),
            }
        }

        /// Catch effect: a few short-lived particles around the food
        fn burst(&self, x: f32, y: f32) {
            let Some(area) = self.area() else { return };
            for _ in 0..PARTICLES_PER_CATCH {
                let Some(particle) = self.create_div("particle") else {
                    return;
                };
                let px = x as f64 + js_sys::Math::random() * FOOD_SIZE as f64;
                let py = y as f64 + js_sys::Math::random() * FOOD_SIZE as f64;
                set_style(&particle, "left", &format!("{}px", px));
                set_style(&particle, "top", &format!("{}px", py));
                let _ = area.append_child(&particle);
                after(PARTICLE_LIFETIME_MS, move || particle.remove());
            }
        }

        /// Push positions and HUD values for the current frame
        fn sync(&self, session: &GameSession) {
            for food in session.foods.all() {
                if let Some(el) = self.foods.get(&food.id) {
                    set_style(el, "top", &format!("{}px", food.pos.y));
                }
            }

            if let Some(shrimp) = html_by_id(&self.document, "shrimp") {
                set_style(&shrimp, "left", &format!("{}px", session.player.x));
                let flip = match session.player.facing {
                    Facing::Left => "scaleX(-1)",
                    Facing::Right => "scaleX(1)",
                };
                set_style(&shrimp, "transform", flip);
            }

            set_text(&self.document, "score", &session.score.to_string());
            set_text(&self.document, "level", &session.level.to_string());
            set_text(&self.document, "speed", &session.speed_label());

            if let Some(timer) = html_by_id(&self.document, "timer") {
                timer.set_text_content(Some(&session.time_left.to_string()));
                let (color, size) = match session.timer_urgency() {
                    TimerUrgency::Critical => ("#ff4444", Some("18px")),
                    TimerUrgency::Warning => ("#ffaa00", None),
                    TimerUrgency::Calm => ("#ffd700", Some("16px")),
                };
                set_style(&timer, "color", color);
                if let Some(size) = size {
                    set_style(&timer, "font-size", size);
                }
            }

            if let Some(pause) = html_by_id(&self.document, "pauseScreen") {
                let display = if session.state == RunState::Paused {
                    "block"
                } else {
                    "none"
                };
                set_style(&pause, "display", display);
            }
        }
    }

    /// Everything the page callbacks share
    struct Game {
        scheduler: Scheduler,
        surface: DomSurface,
        audio: AudioManager,
        settings: Settings,
        interval_id: Option<i32>,
        frame_request: Option<i32>,
    }

    impl Game {
        fn new(document: Document) -> Self {
            Self {
                scheduler: Scheduler::new(Tuning::for_viewport(viewport_width())),
                surface: DomSurface::new(document),
                audio: AudioManager::new(),
                settings: Settings::load(),
                interval_id: None,
                frame_request: None,
            }
        }

        /// Apply pending events and sync the DOM
        fn render(&mut self) {
            let Game {
                scheduler,
                surface,
                audio,
                ..
            } = self;
            let Some(session) = scheduler.session_mut() else {
                return;
            };
            for event in session.drain_events() {
                surface.apply(&event, audio);
            }
            surface.sync(session);
        }

        fn stop_timers(&mut self) {
            let Some(window) = window() else { return };
            if let Some(id) = self.interval_id.take() {
                window.clear_interval_with_handle(id);
            }
            if let Some(id) = self.frame_request.take() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    fn request_frame(game: Rc<RefCell<Game>>, token: FrameToken) {
        let Some(window) = window() else { return };
        let handle = game.clone();
        let closure = Closure::once(move |_time: f64| {
            game_loop(handle, token);
        });
        let id = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok();
        closure.forget();
        game.borrow_mut().frame_request = id;
    }

    /// One fixed tick per animation frame
    fn game_loop(game: Rc<RefCell<Game>>, token: FrameToken) {
        let outcome = {
            let mut g = game.borrow_mut();
            g.frame_request = None;
            let outcome = g.scheduler.on_frame(token);
            g.render();
            outcome
        };

        if outcome == FrameOutcome::Reschedule {
            request_frame(game, token);
        }
    }

    fn on_second(game: &Rc<RefCell<Game>>) {
        let mut g = game.borrow_mut();
        if g.scheduler.on_second() == IntervalOutcome::Cancel {
            g.stop_timers();
        }
        g.render();
    }

    /// Start or restart the mini-game
    fn start_session(game: &Rc<RefCell<Game>>) {
        let Some(window) = window() else { return };
        let seed = js_sys::Date::now() as u64;

        let plan = {
            let mut g = game.borrow_mut();
            g.scheduler.set_tuning(Tuning::for_viewport(viewport_width()));
            let plan = g.scheduler.start(seed);
            if plan.cancel_interval {
                if let Some(id) = g.interval_id.take() {
                    window.clear_interval_with_handle(id);
                }
            }
            g.surface.reset();
            g.render();
            plan
        };

        let handle = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || on_second(&handle));
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                1000,
            )
            .ok();
        closure.forget();
        game.borrow_mut().interval_id = id;

        if let Some(token) = plan.start_frame_loop {
            request_frame(game.clone(), token);
        }
    }

    fn send(game: &Rc<RefCell<Game>>, command: Command) {
        let mut g = game.borrow_mut();
        g.scheduler.handle(command);
        g.render();
    }

    fn setup_game_input(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_event(document, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let live = game
                    .borrow()
                    .scheduler
                    .session()
                    .is_some_and(|s| !s.is_over());
                if !live {
                    return;
                }
                let command = if event.code() == "Space" {
                    Command::TogglePause
                } else {
                    match event.key().as_str() {
                        "ArrowLeft" => Command::MoveLeft,
                        "ArrowRight" => Command::MoveRight,
                        _ => return,
                    }
                };
                if command == Command::TogglePause {
                    event.prevent_default();
                }
                send(&game, command);
            });
        }

        for (id, command) in [
            ("btnLeft", Command::MoveLeft),
            ("btnRight", Command::MoveRight),
            ("btnPause", Command::TogglePause),
        ] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            for kind in ["click", "touchstart"] {
                let game = game.clone();
                on_event(&btn, kind, move |event| {
                    if event.type_() == "touchstart" {
                        event.prevent_default();
                    }
                    send(&game, command);
                });
            }
        }

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            on_event(&btn, "click", move |_| start_session(&game));
        }

        update_mobile_controls();
        if let Some(window) = window() {
            on_event(&window, "resize", |_| update_mobile_controls());
        }
    }

    fn update_mobile_controls() {
        let Some(document) = document() else { return };
        if let Some(controls) = html_by_id(&document, "mobileControls") {
            let display = if viewport_width() <= COMPACT_VIEWPORT_WIDTH {
                "flex"
            } else {
                "none"
            };
            set_style(&controls, "display", display);
        }
    }

    fn show_error(document: &Document, message: Option<&str>) {
        let Some(el) = document.get_element_by_id("error-message") else {
            return;
        };
        match message {
            Some(message) => {
                el.set_text_content(Some(message));
                let _ = el.class_list().add_1("show");
            }
            None => {
                let _ = el.class_list().remove_1("show");
            }
        }
    }

    fn render_avatar_card(document: &Document, game: &Rc<RefCell<Game>>, name: String, avatar: Avatar) {
        let Some(container) = document.get_element_by_id("avatarContainer") else {
            log::warn!("Missing element #avatarContainer");
            return;
        };
        container.set_inner_html(&format!(
            r#"<div class="card">
                <div class="card-inner">
                  <div class="card-front"><p class="decrypting">Decrypting...</p></div>
                  <div class="card-back">
                    <img src="{url}" alt="{rank} Avatar" class="avatar-img">
                    <p class="avatar-rank">Rank: {rank}</p>
                    <p class="avatar-code">Encrypted Code: {code}</p>
                    <a id="download-btn" href="{url}" download="{file}"><button>Download Avatar</button></a>
                    <button id="share-btn">Share Code</button>
                    <button id="copy-btn">Copy Code</button>
                  </div>
                </div>
              </div>"#,
            url = avatar.rank.image_path(),
            rank = avatar.rank,
            code = avatar.code,
            file = avatar.download_filename(),
        ));

        if let Some(btn) = document.get_element_by_id("share-btn") {
            let text = avatar.share_text();
            on_event(&btn, "click", move |_| {
                let _ = share_or_copy("Encrypted Avatar", &text);
            });
        }
        if let Some(btn) = document.get_element_by_id("copy-btn") {
            let code = avatar.code.clone();
            on_event(&btn, "click", move |_| {
                copy_text(&code);
                if let Some(window) = window() {
                    let _ = window.alert_with_message("Encrypted Code copied!");
                }
            });
        }

        let document = document.clone();
        let game = game.clone();
        after(REVEAL_DELAY_MS, move || {
            if let Ok(Some(inner)) = document.query_selector(".card-inner") {
                let _ = inner.class_list().add_1("is-flipped");
                game.borrow().audio.play(SoundEffect::Decrypt);
            }
            if let Err(e) = Gallery::append_saved(&GalleryEntry::new(&name, &avatar)) {
                log::warn!("Avatar not saved to gallery: {}", e);
            }
        });
    }

    fn setup_generator(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(btn) = document.get_element_by_id("generate-btn") else {
            log::warn!("Missing element #generate-btn");
            return;
        };
        let doc = document.clone();
        on_event(&btn, "click", move |_| {
            let raw = doc
                .get_element_by_id("discordInput")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();

            match generate_avatar(&raw) {
                Ok((name, avatar)) => {
                    show_error(&doc, None);
                    log::info!("Generated {} avatar {}", avatar.rank, avatar.code);
                    render_avatar_card(&doc, &game, name, avatar);
                }
                Err(e) => show_error(&doc, Some(&e.to_string())),
            }
        });
    }

    fn render_gallery(document: &Document) {
        let Some(container) = document.get_element_by_id("galleryContainer") else {
            return;
        };
        let gallery = match Gallery::load() {
            Ok(gallery) => gallery,
            Err(e) => {
                log::warn!("{}", e);
                Gallery::new()
            }
        };
        let cards: String = gallery
            .entries()
            .iter()
            .map(|(i, item)| {
                format!(
                    r#"<div class="card gallery-card">
                        <img src="{url}" alt="{rank}">
                        <p>Rank: {rank}</p>
                        <p>Code: {code}</p>
                        <p>Username: {user}</p>
                        <button class="gallery-delete" data-index="{i}">Delete</button>
                      </div>"#,
                    url = item.url,
                    rank = item.rank,
                    code = item.code,
                    user = item.username,
                )
            })
            .collect();
        container.set_inner_html(&cards);

        let Ok(buttons) = container.query_selector_all(".gallery-delete") else {
            return;
        };
        for i in 0..buttons.length() {
            let Some(btn) = buttons.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let Some(index) = btn
                .get_attribute("data-index")
                .and_then(|s| s.parse::<usize>().ok())
            else {
                continue;
            };
            let doc = document.clone();
            on_event(&btn, "click", move |_| {
                if let Err(e) = Gallery::delete_saved(index) {
                    log::warn!("Gallery entry not deleted: {}", e);
                }
                render_gallery(&doc);
            });
        }
    }

    fn setup_gallery(document: &Document) {
        if let Some(btn) = document.get_element_by_id("clear-gallery-btn") {
            let doc = document.clone();
            on_event(&btn, "click", move |_| {
                Gallery::clear_saved();
                render_gallery(&doc);
            });
        }
    }

    fn setup_navigation(document: &Document, game: Rc<RefCell<Game>>) {
        let Ok(links) = document.query_selector_all(".menu a") else {
            return;
        };
        for i in 0..links.length() {
            let Some(link) = links.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let doc = document.clone();
            let game = game.clone();
            let this = link.clone();
            on_event(&link, "click", move |event| {
                event.prevent_default();
                let target = this
                    .get_attribute("href")
                    .map(|h| h.trim_start_matches('#').to_string())
                    .unwrap_or_default();

                if let Ok(sections) = doc.query_selector_all("main section") {
                    for j in 0..sections.length() {
                        if let Some(sec) = sections.item(j).and_then(|n| n.dyn_into::<Element>().ok()) {
                            let _ = sec.class_list().add_1("hidden");
                        }
                    }
                }
                if let Some(section) = doc.get_element_by_id(&target) {
                    let _ = section.class_list().remove_1("hidden");
                }

                if let Ok(all) = doc.query_selector_all(".menu a") {
                    for j in 0..all.length() {
                        if let Some(a) = all.item(j).and_then(|n| n.dyn_into::<Element>().ok()) {
                            let _ = a.class_list().remove_1("active");
                        }
                    }
                }
                let _ = this.class_list().add_1("active");

                match target.as_str() {
                    "gallery" => render_gallery(&doc),
                    "game" => start_session(&game),
                    _ => {}
                }
            });
        }

        if let (Ok(Some(hamburger)), Ok(Some(menu))) = (
            document.query_selector(".hamburger"),
            document.query_selector(".menu"),
        ) {
            on_event(&hamburger, "click", move |_| {
                let _ = menu.class_list().toggle("show");
            });
        }
    }

    fn apply_theme(document: &Document, settings: &Settings) {
        if let Some(body) = document.body() {
            let light = settings.theme == avatar_arcade::ThemeMode::Light;
            let _ = body.class_list().toggle_with_force("light-mode", light);
        }
        set_text(document, "mode-toggle", settings.theme.icon());
    }

    fn setup_theme_toggle(document: &Document, game: Rc<RefCell<Game>>) {
        apply_theme(document, &game.borrow().settings);
        if let Some(btn) = document.get_element_by_id("mode-toggle") {
            let doc = document.clone();
            on_event(&btn, "click", move |_| {
                let mut g = game.borrow_mut();
                g.settings.toggle_theme();
                apply_theme(&doc, &g.settings);
            });
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }
        log::info!("Avatar Arcade starting...");

        let Some(document) = document() else {
            log::error!("No document available");
            return;
        };

        let game = Rc::new(RefCell::new(Game::new(document.clone())));

        setup_theme_toggle(&document, game.clone());
        setup_generator(&document, game.clone());
        setup_gallery(&document);
        setup_navigation(&document, game.clone());
        setup_game_input(&document, game);

        log::info!("Page ready");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Avatar Arcade (native) starting...");

    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "alice#1234".to_string());
    match avatar_arcade::generate_avatar(&name) {
        Ok((name, avatar)) => {
            println!("{} -> {} {}", name, avatar.rank, avatar.code);
        }
        Err(e) => {
            eprintln!("{}: {}", name, e);
            std::process::exit(1);
        }
    }

    let (score, level) = headless_session(2024);
    println!("Autopilot session: score {} at level {}", score, level);
}

/// Play one full session without a display, steering toward the lowest food
#[cfg(not(target_arch = "wasm32"))]
fn headless_session(seed: u64) -> (u64, u32) {
    use avatar_arcade::consts::REFERENCE_FPS;
    use avatar_arcade::sim::{Command, FrameOutcome, IntervalOutcome, Scheduler};
    use avatar_arcade::Tuning;

    let mut scheduler = Scheduler::new(Tuning::default());
    let plan = scheduler.start(seed);
    let Some(token) = plan.start_frame_loop else {
        return (0, 1);
    };

    loop {
        for _ in 0..REFERENCE_FPS as u32 {
            let command = scheduler.session().and_then(|session| {
                let center = session.player_rect().center().x;
                let step = session.tuning.player_step;
                let target = session
                    .foods
                    .all()
                    .iter()
                    .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                    .map(|f| f.pos.x + session.tuning.area.food_size / 2.0)?;
                if target < center - step {
                    Some(Command::MoveLeft)
                } else if target > center + step {
                    Some(Command::MoveRight)
                } else {
                    None
                }
            });
            if let Some(command) = command {
                scheduler.handle(command);
            }
            if scheduler.on_frame(token) == FrameOutcome::Stop {
                break;
            }
            if let Some(session) = scheduler.session_mut() {
                session.drain_events();
            }
        }
        if scheduler.on_second() == IntervalOutcome::Cancel {
            break;
        }
    }

    scheduler
        .session()
        .map(|s| (s.score, s.level))
        .unwrap_or((0, 1))
}
