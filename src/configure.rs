//! Service configuration and dispatch.
//!
//! `configure_services` turns an options structure into a wired editor
//! context: it fills in derived option defaults, constructs the enabled
//! services, links them to the update service, registers the model-change
//! and server-state listeners, and installs a [`ServiceDispatcher`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::{
    DEFAULT_SERVER_URL, InvokeOverrides, SYNTHETIC_RESOURCE_PREFIX, ServiceOptions, SharedOptions,
    language_from_resource,
};
use crate::editor::EditorContext;
use crate::error::{ServiceError, ServiceResult};
use crate::services::{
    ContentAssistService, Invocation, LoadResourceService, RevertResourceService,
    SaveResourceService, ServiceKind, UpdateService, ValidationService,
};
use crate::transport::Transport;

/// Routes service invocations to the instances built for one editor context.
///
/// Each kind holds at most one instance; `None` means the options disabled it.
pub struct ServiceDispatcher {
    options: SharedOptions,
    load: Option<Rc<LoadResourceService>>,
    save: Option<Rc<SaveResourceService>>,
    revert: Option<Rc<RevertResourceService>>,
    validation: Option<Rc<ValidationService>>,
    update: Option<Rc<UpdateService>>,
    content_assist: Option<Rc<ContentAssistService>>,
}

impl ServiceDispatcher {
    /// Whether an instance of `kind` was constructed
    pub fn has_service(&self, kind: ServiceKind) -> bool {
        match kind {
            ServiceKind::Load => self.load.is_some(),
            ServiceKind::Save => self.save.is_some(),
            ServiceKind::Revert => self.revert.is_some(),
            ServiceKind::Validation => self.validation.is_some(),
            ServiceKind::ContentAssist => self.content_assist.is_some(),
            ServiceKind::Update => self.update.is_some(),
        }
    }

    /// Constructed services, in declaration order
    pub fn services(&self) -> Vec<ServiceKind> {
        [
            ServiceKind::Load,
            ServiceKind::Save,
            ServiceKind::Revert,
            ServiceKind::Validation,
            ServiceKind::ContentAssist,
            ServiceKind::Update,
        ]
        .into_iter()
        .filter(|kind| self.has_service(*kind))
        .collect()
    }

    /// Invoke `kind` with the base options overlaid by `overrides`.
    ///
    /// Content assist additionally receives the current caret offset and
    /// selection, replacing whatever the overrides carried, and is the only
    /// kind that returns an [`Invocation`].
    pub fn invoke(
        &self,
        context: &EditorContext,
        kind: ServiceKind,
        overrides: &InvokeOverrides,
    ) -> ServiceResult<Option<Invocation>> {
        let mut options = self.options.borrow().merged(overrides);
        let not_available = || ServiceError::not_available(kind.as_str());

        log::debug!(target: "xtext_web_client::dispatch", "Invoking {}", kind);

        match kind {
            ServiceKind::Load => {
                let service = self.load.as_ref().ok_or_else(not_available)?;
                service.load_resource(context, &options);
                Ok(None)
            }
            ServiceKind::Save => {
                let service = self.save.as_ref().ok_or_else(not_available)?;
                service.save_resource(context, &options);
                Ok(None)
            }
            ServiceKind::Revert => {
                let service = self.revert.as_ref().ok_or_else(not_available)?;
                service.revert_resource(context, &options);
                Ok(None)
            }
            ServiceKind::Validation => {
                let service = self.validation.as_ref().ok_or_else(not_available)?;
                service.compute_problems(context, &options);
                Ok(None)
            }
            ServiceKind::ContentAssist => {
                let service = self.content_assist.as_ref().ok_or_else(not_available)?;
                options.offset = Some(context.caret_offset());
                options.selection = Some(context.selection());
                Ok(Some(service.compute_content_assist(context, &options)))
            }
            // Driven by model changes only
            ServiceKind::Update => Err(not_available()),
        }
    }
}

/// Create a fresh editor context and configure its services.
pub fn create_editor(
    options: ServiceOptions,
    transport: Rc<dyn Transport>,
) -> ServiceResult<EditorContext> {
    let context = EditorContext::new();
    configure_services(&context, Rc::new(RefCell::new(options)), transport)?;
    Ok(context)
}

/// Wire services into `context` according to `options`.
///
/// `options` is mutated in place (derived language, resource id, server URL
/// and load flag) and installed on the context by reference. Calling this
/// twice on one context registers every listener twice.
pub fn configure_services(
    context: &EditorContext,
    options: SharedOptions,
    transport: Rc<dyn Transport>,
) -> ServiceResult<()> {
    options.borrow().validate()?;
    let (resolved, persistence_enabled) = resolve_options(&mut options.borrow_mut());
    context.set_options(Rc::clone(&options));

    let server_url = resolved.server_url().to_string();
    let resource_id = resolved.resource_id.as_deref();

    let persistence = match resource_id {
        Some(resource_id) if persistence_enabled => {
            let load = Rc::new(LoadResourceService::new(
                &server_url,
                resource_id,
                Rc::clone(&transport),
            ));
            load.load_resource(context, &resolved);
            let save = Rc::new(SaveResourceService::new(
                &server_url,
                resource_id,
                Rc::clone(&transport),
            ));
            let revert = Rc::new(RevertResourceService::new(
                &server_url,
                resource_id,
                Rc::clone(&transport),
            ));
            Some((load, save, revert))
        }
        _ => None,
    };
    let (load, save, revert) = match persistence {
        Some((load, save, revert)) => (Some(load), Some(save), Some(revert)),
        None => (None, None, None),
    };

    let validation = resolved.enable_validation_service.then(|| {
        Rc::new(ValidationService::new(
            &server_url,
            resource_id,
            Rc::clone(&transport),
        ))
    });

    let refresh_document = {
        let validation = validation.clone();
        let options = Rc::clone(&options);
        Rc::new(move |context: &EditorContext| {
            context.clear_client_service_state();
            if let Some(validation) = &validation {
                let options = options.borrow().clone();
                validation.compute_problems(context, &options);
            }
        })
    };

    let update = (!resolved.send_full_text).then(|| {
        Rc::new(UpdateService::new(
            &server_url,
            resource_id,
            Rc::clone(&transport),
        ))
    });
    if let Some(update) = &update {
        if let Some(save) = &save {
            save.set_update_service(Rc::clone(update));
        }
        let refresh_document = Rc::clone(&refresh_document);
        context.add_server_state_listener(move |context| refresh_document(context));
    }

    {
        let update = update.clone();
        let options = Rc::clone(&options);
        let refresh_document = Rc::clone(&refresh_document);
        context.add_model_change_listener(move |context, _text| {
            let options = options.borrow().clone();
            if options.send_full_text {
                refresh_document(context);
            } else if let Some(update) = &update {
                update.update(context, &options);
            }
        });
    }

    let content_assist = resolved.enable_content_assist_service.then(|| {
        let service = ContentAssistService::new(&server_url, resource_id, Rc::clone(&transport));
        if let Some(update) = &update {
            service.set_update_service(Rc::clone(update));
        }
        Rc::new(service)
    });

    let dispatcher = ServiceDispatcher {
        options,
        load,
        save,
        revert,
        validation,
        update,
        content_assist,
    };
    log::debug!(
        target: "xtext_web_client::dispatch",
        "Configured services: {:?}",
        dispatcher.services()
    );
    context.install_dispatcher(Rc::new(dispatcher));
    context.clear_service_listeners();
    Ok(())
}

/// Fill in derived defaults and return a snapshot of the result, along with
/// whether the persistence services apply.
///
/// Persistence needs a caller-supplied resource id; a synthesized
/// `text.<lang>` id never enables it.
fn resolve_options(options: &mut ServiceOptions) -> (ServiceOptions, bool) {
    // Empty ids count as unset
    if options.resource_id.as_deref() == Some("") {
        options.resource_id = None;
    }
    if options.xtext_lang.as_deref() == Some("") {
        options.xtext_lang = None;
    }

    if options.xtext_lang.is_none() {
        if let Some(resource_id) = &options.resource_id {
            let language = language_from_resource(resource_id);
            if !language.is_empty() {
                options.xtext_lang = Some(language.to_string());
            }
        }
    }

    if options.server_url.is_none() {
        options.server_url = Some(DEFAULT_SERVER_URL.to_string());
    }

    let mut persistence_enabled = false;
    if options.resource_id.is_some() {
        if options.load_from_server != Some(false) {
            options.load_from_server = Some(true);
            persistence_enabled = true;
        }
    } else {
        if options.load_from_server.is_none() {
            options.load_from_server = Some(false);
        }
        if let Some(xtext_lang) = &options.xtext_lang {
            options.resource_id = Some(format!("{SYNTHETIC_RESOURCE_PREFIX}{xtext_lang}"));
        }
    }

    (options.clone(), persistence_enabled)
}
