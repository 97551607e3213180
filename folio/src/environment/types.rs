use folio_core_contact_impl::ContactFeatureServiceImpl;
use folio_core_health_impl::HealthFeatureServiceImpl;
use folio_email_impl::EmailServiceImpl;
use folio_extern_impl::contact::ContactApiServiceImpl;
use folio_form::ContactFormController;
use folio_shared_impl::time::TimeServiceImpl;
use folio_templates_impl::TemplateServiceImpl;

// API
pub type RestServer = folio_api_rest::RestServer<HealthFeature, ContactFeature>;

// Email
pub type Email = EmailServiceImpl;

// Templates
pub type Template = TemplateServiceImpl;

// Shared
pub type Time = TimeServiceImpl;

// Core
pub type ContactFeature = ContactFeatureServiceImpl<Time, Template, Email>;
pub type HealthFeature = HealthFeatureServiceImpl<Time, Email>;

// Extern
pub type ContactApi = ContactApiServiceImpl;

// Client
pub type ContactForm = ContactFormController<ContactApi>;
