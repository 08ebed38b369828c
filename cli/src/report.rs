//! The miVoto functional and technical report.
//!
//! Content is plain data; [`build_report`] turns it into a document.

use chrono::{DateTime, Local};
use docweave::{Document, TextRun};

const TITLE: &str = "Proyecto miVoto - Documentación Funcional y Técnica";

/// Content of one report section.
enum Entry {
    /// Unstyled paragraph
    Text(&'static str),
    /// Bulleted list
    Bullets(&'static [&'static str]),
    /// Numbered list, restarting at 1
    Steps(&'static [&'static str]),
}

use Entry::{Bullets, Steps, Text};

const SECTIONS: &[(&str, &[Entry])] = &[
    (
        "1. Visión general",
        &[Text(
            "miVoto es una plataforma de votación digital que combina autenticación con MiArgentina, \
             almacenamiento de resultados en Firestore y registro de votos en una blockchain EVM mediante \
             un Soulbound Token (SBT). El sistema permite realizar el ciclo completo de una elección: \
             login, emisión de token de elegibilidad, voto, recuento y verificación.",
        )],
    ),
    (
        "2. Arquitectura",
        &[
            Text("Componentes principales:"),
            Bullets(&[
                "Frontend Vite/React (puerto 3000).",
                "Backend Spring Boot (puerto 8080).",
                "Mock MiArgentina OAuth (puerto 9999) con selección de identidades.",
                "Firestore (emulador o proyecto real).",
                "Nodo EVM (Hardhat/Anvil o testnet) con contratos MiVotoSoulboundToken y MiVotoElection.",
            ]),
        ],
    ),
    (
        "3. Flujo de autenticación y elegibilidad",
        &[Steps(&[
            "El usuario ingresa al mock MiArgentina y elige una identidad demo. \
             La pantalla muestra quiénes ya votaron consultando /internal/vote-status.",
            "El backend guarda la sesión (subject, nombre, email) y expone /auth/session para el frontend.",
            "En la UI se solicita un token de elegibilidad mediante /eligibility/issue/session, \
             enviando la dirección Ethereum que recibirá el SBT.",
            "El backend valida el id_token, genera un token firmado con expiración de 2 horas, \
             registra la emisión en Firestore y opcionalmente invoca MiVotoElection.issueToken.",
        ])],
    ),
    (
        "4. Flujo de voto y emisión del SBT",
        &[Steps(&[
            "El usuario selecciona boleta y candidatos y envía /votes/cast con el token de elegibilidad.",
            "VotingService valida que la boleta esté abierta, que el token sea válido y que el sujeto \
             no haya votado previamente (hash del subject).",
            "Calcula voteHash y receipt, guarda el voto en Firestore, marca el token como consumido \
             y registra el evento de auditoría.",
            "En modo real, VoteContractService invoca MiVotoElection.castVote, que acuña un SBT \
             en la wallet del votante y emite el evento VoteCast. El backend devuelve receipt, txHash y sbtTokenId.",
            "La verificación puede hacerse desde la UI (recuento, verificación de recibo) o vía ownerOf(tokenId) \
             y balanceOf(wallet) sobre el contrato del SBT.",
        ])],
    ),
    (
        "5. Contratos inteligentes",
        &[
            Text("MiVotoSoulboundToken (SBT):"),
            Bullets(&[
                "Extiende ERC-721, pero bloquea transferencias (sólo mint/burn).",
                "setMinter permite delegar la emisión al contrato de votación.",
            ]),
            Text("MiVotoElection:"),
            Bullets(&[
                "issueToken registra hash de token y dirección del votante.",
                "castVote consume el token, acuña el SBT si aún no existe y marca el receipt.",
                "Eventos TokenIssued y VoteCast facilitan la auditoría on-chain.",
            ]),
        ],
    ),
    (
        "6. Configuración clave",
        &[Bullets(&[
            "WEB3_RPC_URL, WEB3_CHAIN_ID, VOTE_CONTRACT_ADDR, WEB3_PRIVATE_KEY.",
            "WEB3_MOCK_ENABLED=true para modo simulador; false para blockchain real.",
            "FIREBASE_* para conectarse a Firestore real o emulador.",
            "FRONT_ORIGIN y CORS configurados en ProdCorsConfig.",
        ])],
    ),
    (
        "7. Mock MiArgentina",
        &[
            Text("Características principales:"),
            Bullets(&[
                "Endpoints /oauth/authorize, /oauth/token y /oauth/userinfo.",
                "15 usuarios demo; la pantalla de selección consulta /internal/vote-status y marca quién votó.",
                "Genera id_token con formato stub-id-token.<payload base64url> que MiArgentinaTokenVerifier decodifica.",
            ]),
        ],
    ),
    (
        "8. Persistencia",
        &[Bullets(&[
            "Firestore almacena instituciones, candidatos, boletas, votos, elegibilidades, resultados y auditoría.",
            "Los votos guardan ballotId, institutionId, candidateIds, voteHash, tokenHash, subjectHash, receipt, \
             txHash, sbtTokenId y createdAt.",
            "SeedService crea datos demo y /seed/default permite resembrar rápidamente.",
        ])],
    ),
    (
        "9. Scripts CLI y automatización",
        &[Bullets(&[
            "Makefile: login, seed, seed-close, token, token-json, vote, tally, clean-cookies.",
            "Scripts en /scripts: common, login (LOGIN_USER), issue-token (WALLET_ADDRESS), vote, tally, seed.*.",
            "Hardhat scripts: deploy.sample.js despliega contratos; check-owner.js revisa ownerOf/tokenId.",
        ])],
    ),
    (
        "10. Pruebas y despliegue rápido",
        &[Steps(&[
            "Levantar `npx hardhat node` para red local.",
            "Ejecutar `npx hardhat run --network localhost contracts/deploy.sample.js` para desplegar SBT + Election.",
            "Actualizar docker/env/backend.env y reiniciar `docker compose up --build`.",
            "Iniciar sesión con un usuario disponible, ingresar wallet, pedir token y votar.",
            "Verificar con `/votes/{receipt}/verify` y `npx hardhat run scripts/check-owner.js`.",
        ])],
    ),
    (
        "11. Consideraciones de seguridad",
        &[Bullets(&[
            "Un voto por subject: VotingService bloquea duplicados con subjectHash.",
            "Los tokens de elegibilidad expiran y se marcan como consumidos tras el voto.",
            "CORS habilitado únicamente para FRONT_ORIGIN.",
            "En producción conviene restringir /internal/vote-status.",
        ])],
    ),
    (
        "12. Próximos pasos sugeridos",
        &[Bullets(&[
            "Integrar MiArgentina y Firestore reales con políticas de seguridad.",
            "Aplicar reglas de Firestore y control de acceso por rol.",
            "Automatizar pruebas end-to-end y scripts de despliegue a testnet.",
            "Extender auditoría y observabilidad (Actuator, métricas, logs estructurados).",
        ])],
    ),
];

/// Builds the report. `generated_at` fills the "Generado el" line and the
/// creation timestamp.
pub fn build_report(generated_at: &DateTime<Local>) -> docweave::Result<Document> {
    let mut doc = Document::new().with_created(generated_at.to_rfc3339());

    doc.add_heading(0, TITLE)?;
    doc.add_paragraph(
        vec![TextRun::italic(format!(
            "Generado el {}",
            generated_at.format("%d/%m/%Y %H:%M:%S")
        ))],
        None,
    )?;

    for (heading, entries) in SECTIONS {
        doc.add_heading(1, *heading)?;
        for entry in entries.iter() {
            match entry {
                Text(text) => {
                    doc.add_text(*text);
                }
                Bullets(items) => {
                    for item in items.iter() {
                        doc.add_bullet(*item);
                    }
                }
                Steps(items) => {
                    for item in items.iter() {
                        doc.add_numbered(*item);
                    }
                }
            }
        }
    }

    log::debug!("report built with {} blocks", doc.len());
    Ok(doc)
}
