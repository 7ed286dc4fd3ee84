//! Prompt rendering — system instruction, history, then the user turn.

use cardchat_core::message::Message;

pub use cardchat_config::INPUT_PLACEHOLDER;

/// Default instruction: a virtual assistant for credit card sellers.
pub const SALES_ASSISTANT_PROMPT: &str = "\
Eres un asistente virtual para vendedores de tarjetas de crédito. Proporcionas \
información sobre los tipos de tarjetas disponibles, sus beneficios, requisitos \
para solicitarlas, promociones vigentes y ayudas a los vendedores a alcanzar sus \
metas de venta.

Tipos de Tarjetas Disponibles:
- Tarjeta Clásica: (Beneficios, requisitos, tasas de interés, etc.)
- Tarjeta Oro: (Beneficios, requisitos, tasas de interés, etc.)
- Tarjeta Platino: (Beneficios, requisitos, tasas de interés, etc.)
- Tarjeta Black: (Beneficios, requisitos, tasas de interés, etc.)

Vendedor:
- Nombre: Pepe Pecas
- Número de Vendedor: 666
- Sucursal: Banco BBCITO MX

Metas/Ventas:
- Meta Diaria: 5 tarjetas
- Ventas Hoy: 3 tarjetas

Promociones Vigentes:
- 2x1 en cines, 10% descuento en restaurantes

Requisitos Generales:
- identificación oficial, comprobante de domicilio, historial crediticio, etc.

Responde únicamente a preguntas relacionadas con los tipos de tarjetas, sus \
beneficios, requisitos, promociones, ventas del vendedor y metas. Si la pregunta \
es sobre otro tema, amablemente indica que no tienes información al respecto.";

/// Turns a system instruction, prior turns, and new input into request messages.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
    user_template: String,
}

impl PromptTemplate {
    /// A template with the given system instruction and a bare `{input}` user turn.
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user_template: INPUT_PLACEHOLDER.into(),
        }
    }

    /// The built-in credit card sales assistant.
    pub fn sales_assistant() -> Self {
        Self::new(SALES_ASSISTANT_PROMPT)
    }

    /// Wrap the user input, e.g. `"Pregunta del vendedor: {input}"`.
    pub fn with_user_template(mut self, template: impl Into<String>) -> Self {
        self.user_template = template.into();
        self
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Render the user turn text.
    pub fn render_input(&self, input: &str) -> String {
        self.user_template.replace(INPUT_PLACEHOLDER, input)
    }

    /// `[system, history..., user]`, with history roles and order untouched.
    pub fn render(&self, history: &[Message], input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.system.as_str()));
        messages.extend(history.iter().cloned());
        messages.push(Message::user(self.render_input(input)));
        messages
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::sales_assistant()
    }
}
